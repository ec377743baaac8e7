//! I/O Panel
//!
//! Five indicator lamps for the input mask and five for the output mask.

use iced::widget::{column, container, row, text, Column, Space};
use iced::{Alignment, Background, Border, Color, Element, Length};

use pallet_core::io_state::IO_BITS;
use pallet_core::IoState;

use crate::Message;

const LAMP_ON: Color = Color::from_rgb(76.0 / 255.0, 175.0 / 255.0, 80.0 / 255.0);
const LAMP_OFF: Color = Color::from_rgb(244.0 / 255.0, 67.0 / 255.0, 54.0 / 255.0);

/// Render the INPUTS / OUTPUTS lamp columns
pub fn view_io_panel(state: IoState) -> Element<'static, Message> {
    row![
        lamp_column("INPUTS", state.input_bits()),
        Space::new().width(Length::Fill),
        lamp_column("OUTPUTS", state.output_bits()),
    ]
    .width(Length::Fill)
    .into()
}

fn lamp_column(title: &'static str, bits: [bool; IO_BITS]) -> Column<'static, Message> {
    let mut col = column![text(title).size(12)].spacing(4);
    for (i, on) in bits.into_iter().enumerate() {
        col = col.push(
            row![
                lamp(on),
                text(format!("Bit {}", i)).size(11).width(Length::Fixed(40.0)),
                text(if on { "1" } else { "0" }).size(11),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
        );
    }
    col
}

fn lamp(on: bool) -> Element<'static, Message> {
    let color = if on { LAMP_ON } else { LAMP_OFF };
    container(Space::new().width(14).height(14))
        .style(move |_| container::Style {
            background: Some(Background::Color(color)),
            border: Border {
                color: Color::BLACK,
                width: 1.0,
                radius: 7.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}
