//! econ-bots: welcome, events and working-paper bots for an economics department Zulip.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
