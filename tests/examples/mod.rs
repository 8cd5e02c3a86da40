mod assertion_tests;
mod concurrency_tests;
mod delete_mock_tests;
mod multi_server_tests;
mod path_param_tests;
mod search_param_tests;
