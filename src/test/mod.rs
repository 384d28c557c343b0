
pub use test_helper::with_input_and_output_paths;
