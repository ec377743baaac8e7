//! Orders Panel
//!
//! The order queue, listed by destination. A row can be selected and moved
//! up or down (which swaps destinations with its neighbour) or deleted.

use iced::widget::{button, column, row, rule, scrollable, text, Column, Space};
use iced::{Alignment, Element, Length, Padding};

use pallet_core::Order;

use crate::Message;

const COLUMN_WIDTH: f32 = 80.0;

/// Render the orders table and its action buttons
///
/// `orders` must already be in display order.
pub fn view_orders_panel<'a>(orders: &'a [Order], selected: Option<i64>) -> Element<'a, Message> {
    let header = row![
        text("Origin").size(11).width(Length::Fixed(COLUMN_WIDTH)),
        text("Destination").size(11).width(Length::Fixed(COLUMN_WIDTH)),
        text("Pallet").size(11),
    ];

    let mut rows: Column<'_, Message> = column![].spacing(2);
    if orders.is_empty() {
        rows = rows.push(text("No orders").size(11).color([0.5, 0.5, 0.5]));
    }
    for order in orders {
        let pallet = order
            .pallet_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let content = row![
            text(order.origin.to_string()).size(11).width(Length::Fixed(COLUMN_WIDTH)),
            text(order.destination.to_string()).size(11).width(Length::Fixed(COLUMN_WIDTH)),
            text(pallet).size(11),
        ]
        .align_y(Alignment::Center);

        let style = if selected == Some(order.id) {
            button::primary
        } else {
            button::text
        };
        rows = rows.push(
            button(content)
                .on_press(Message::SelectOrder(order.id))
                .padding(Padding::from([2, 4]))
                .width(Length::Fill)
                .style(style),
        );
    }

    let has_selection = selected.is_some();
    let action = |label: &'static str, message: Message| {
        let b = button(text(label).size(11))
            .padding(Padding::from([4, 8]))
            .style(button::secondary);
        if has_selection { b.on_press(message) } else { b }
    };

    let buttons = row![
        action("Up", Message::MoveOrder(pallet_core::MoveDirection::Up)),
        action("Down", Message::MoveOrder(pallet_core::MoveDirection::Down)),
        action("Delete", Message::DeleteOrder),
        Space::new().width(Length::Fill),
        button(text("Add order").size(11))
            .on_press(Message::AddOrder)
            .padding(Padding::from([4, 8]))
            .style(button::primary),
    ]
    .spacing(4);

    column![
        text(format!("Orders ({})", orders.len())).size(14),
        header,
        rule::horizontal(1),
        scrollable(rows).height(Length::Fixed(180.0)),
        buttons,
        button(text("Reset destinations").size(11))
            .on_press(Message::ResetDestinations)
            .padding(Padding::from([4, 8]))
            .width(Length::Fill)
            .style(button::secondary),
    ]
    .spacing(6)
    .into()
}
