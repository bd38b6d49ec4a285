mod commands;
mod engine;
