use std::io::Write;

use crate::{
    common::util::title_case,
    server::{matchers::Mismatch, state::ClosestMatch},
};

use tabwriter::TabWriter;

pub(crate) fn fail_with(
    handler: &str,
    actual_hits: usize,
    expected_hits: usize,
    closest_match: Option<ClosestMatch>,
) -> ! {
    let mut output = format!(
        "{} of {} expected requests matched handler {}.\n",
        actual_hits, expected_hits, handler
    );

    match closest_match {
        None => output.push_str("No unmatched request has been received by the mock server."),
        Some(closest_match) => {
            output.push_str(&format!(
                "Here is a comparison with the most similar unmatched request (request number {}): {} {}\n\n",
                closest_match.request_index + 1,
                closest_match.request.method(),
                closest_match.request.url()
            ));

            for (idx, mismatch) in closest_match.mismatches.iter().enumerate() {
                output.push_str(&create_mismatch_output(idx, mismatch));
            }
        }
    }

    panic!("{}", output)
}

pub(crate) fn create_mismatch_output(idx: usize, mismatch: &Mismatch) -> String {
    let mut tw = TabWriter::new(vec![]);

    write_lines(&mut tw, |tw| {
        writeln!(tw, "{}", &"-".repeat(60))?;
        writeln!(tw, "{} : {} Mismatch", idx + 1, title_case(&mismatch.entity))?;
        writeln!(tw, "{}", &"-".repeat(60))?;
        writeln!(tw, "Expected:\t{}", mismatch.expected)?;
        writeln!(tw, "Received:\t{}", mismatch.actual)?;
        writeln!(tw)
    });

    into_string(tw)
}

/// Renders the table of handlers that have never been called.
pub(crate) fn uncalled_output(handlers: &[(String, String)]) -> String {
    let mut tw = TabWriter::new(vec![]);

    write_lines(&mut tw, |tw| {
        writeln!(
            tw,
            "{} of the registered handlers were never called:\n",
            handlers.len()
        )?;
        writeln!(tw, "BASE URL\tHANDLER")?;
        for (base_url, handler) in handlers {
            writeln!(tw, "{}\t{}", base_url, handler)?;
        }
        Ok(())
    });

    into_string(tw)
}

// Writing into an in-memory buffer cannot fail.
fn write_lines<F>(tw: &mut TabWriter<Vec<u8>>, f: F)
where
    F: FnOnce(&mut TabWriter<Vec<u8>>) -> std::io::Result<()>,
{
    if let Err(err) = f(tw).and_then(|_| tw.flush()) {
        tracing::error!("Cannot render assertion output: {}", err);
    }
}

fn into_string(tw: TabWriter<Vec<u8>>) -> String {
    match tw.into_inner() {
        Ok(buf) => String::from_utf8_lossy(&buf).to_string(),
        Err(err) => {
            tracing::error!("Cannot render assertion output: {}", err);
            String::new()
        }
    }
}
