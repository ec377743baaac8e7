//! Status Bar (Bottom)
//!
//! Displays:
//! - Data directory
//! - Loaded map path
//! - Time of the last I/O refresh (and whether it failed)
//! - Status messages

use std::path::{Path, PathBuf};

use chrono::Local;
use iced::widget::{row, text, Space};
use iced::{Element, Length, Padding};

use pallet_core::IoReading;

use crate::Message;

/// Render the status bar
pub fn view_status_bar<'a>(
    data_dir: &'a Path,
    map_path: Option<&'a PathBuf>,
    last_reading: Option<&'a IoReading>,
    status: &'a str,
) -> Element<'a, Message> {
    let map_info = match map_path {
        Some(path) => path.display().to_string(),
        None => "No map".to_string(),
    };

    let io_info = match last_reading {
        Some(reading) => {
            let at = reading.read_at.with_timezone(&Local).format("%H:%M:%S");
            match &reading.error {
                Some(_) => format!("I/O read failed at {}", at),
                None => format!("I/O {}", at),
            }
        }
        None => "I/O idle".to_string(),
    };
    let io_failed = last_reading.is_some_and(|r| r.error.is_some());

    row![
        text(format!("Data: {}", data_dir.display())).size(10),
        Space::new().width(12),
        text(map_info).size(10),
        Space::new().width(12),
        if io_failed {
            text(io_info).size(10).color([0.8, 0.2, 0.2])
        } else {
            text(io_info).size(10)
        },
        Space::new().width(Length::Fill),
        text(status).size(10),
    ]
    .padding(Padding::from([4, 0]))
    .into()
}
