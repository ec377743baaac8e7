//! Properties Panel
//!
//! Two-column table of the selected pallet's attributes. Editable cells are
//! text inputs; a value is coerced and written back when Enter is pressed.
//! ID, X and Y are shown read-only.

use std::collections::HashMap;

use iced::widget::{column, container, row, rule, text, text_input, Column, Space};
use iced::{Alignment, Element, Length};

use pallet_core::{Pallet, PalletField};

use crate::Message;

/// Render the properties table for `pallet`
///
/// `drafts` holds text the user has typed but not yet submitted; fields
/// without a draft show the stored value.
pub fn view_properties_panel<'a>(
    pallet: Option<&'a Pallet>,
    drafts: &'a HashMap<PalletField, String>,
) -> Element<'a, Message> {
    let Some(pallet) = pallet else {
        return column![
            text("Properties").size(14),
            Space::new().height(8),
            text("Click a pallet on the map to edit it.").size(11).color([0.5, 0.5, 0.5]),
        ]
        .spacing(4)
        .into();
    };

    let mut table: Column<'_, Message> = column![
        row![
            text("Property").size(11).width(Length::Fixed(90.0)),
            text("Value").size(11),
        ],
        rule::horizontal(1),
    ]
    .spacing(4);

    for &field in PalletField::ALL {
        let value = drafts
            .get(&field)
            .cloned()
            .unwrap_or_else(|| pallet.display_value(field));
        table = table.push(property_row(field, value));
    }

    container(column![text(format!("Pallet {}", pallet.id)).size(14), Space::new().height(8), table])
        .width(Length::Fill)
        .into()
}

fn property_row<'a>(field: PalletField, value: String) -> Element<'a, Message> {
    let label = text(field.display_name()).size(11).width(Length::Fixed(90.0));

    let cell: Element<'a, Message> = if field.is_editable() {
        text_input("", &value)
            .on_input(move |s| Message::PropertyEdited(field, s))
            .on_submit(Message::PropertySubmitted(field))
            .width(Length::Fill)
            .padding(4)
            .size(11)
            .into()
    } else {
        container(text(value).size(11).color([0.5, 0.5, 0.5]))
            .padding(4)
            .width(Length::Fill)
            .into()
    };

    row![label, cell].align_y(Alignment::Center).into()
}
