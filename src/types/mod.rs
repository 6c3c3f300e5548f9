pub mod submission;

pub use submission::SubmitRequest;
