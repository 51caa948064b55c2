pub mod aggregate;
pub mod api_types;
pub mod budget;
pub mod cancel;
pub mod collect;
pub mod config;
pub mod context;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod estimators;
pub mod lexicon;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod render;
pub mod sources;
pub mod store;
pub mod text;
pub mod weights;
