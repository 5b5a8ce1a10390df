pub mod file;
pub mod health;
pub mod upload_form;

pub use file::FileService;
pub use health::HealthService;
pub use upload_form::UploadForm;
