
mod refresh_tests;
mod retry_tests;
