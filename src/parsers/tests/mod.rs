
mod page_model_tests;
