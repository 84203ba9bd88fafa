pub mod gateway;
pub mod gemini;
pub mod openai;

pub use gateway::ModelGateway;
pub use gemini::GeminiModelAdapter;
pub use openai::OpenAiModelAdapter;
