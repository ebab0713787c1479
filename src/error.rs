// Copyright (c) 2026 rezky_nightky

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::font::FontError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("font setup failed: {0}")]
    Font(#[from] FontError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
