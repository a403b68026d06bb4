pub mod terminal_prompt;
