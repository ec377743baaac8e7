//! Toolbar component
//!
//! Contains map operations (Open Map, Clear Map), order maintenance, the
//! settings dropdown, and Quit.

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length, Padding};

use crate::Message;

/// Render the application header with title and the loaded map name
pub fn view_header(map_name: Option<String>) -> Element<'static, Message> {
    row![
        text("Palletmap").size(28),
        Space::new().width(Length::Fill),
        text(map_name.unwrap_or_else(|| "No map loaded".to_string())).size(14),
    ]
    .align_y(Alignment::Center)
    .into()
}

/// Render the toolbar with file operations and settings dropdown
pub fn view_toolbar(has_map: bool, settings_menu_open: bool) -> Element<'static, Message> {
    let clear_button = button(text("Clear Map").size(11))
        .padding(Padding::from([4, 8]))
        .style(button::secondary);
    let clear_button = if has_map {
        clear_button.on_press(Message::ClearMap)
    } else {
        clear_button
    };

    let map_buttons = row![
        button(text("Open Map").size(11))
            .on_press(Message::OpenMap)
            .padding(Padding::from([4, 8]))
            .style(button::primary),
        clear_button,
        button(text("Reload Pallets").size(11))
            .on_press(Message::ReloadPallets)
            .padding(Padding::from([4, 8]))
            .style(button::secondary),
    ]
    .spacing(4);

    let settings_button_text = if settings_menu_open { "Settings ▲" } else { "Settings ▼" };
    let settings_button = button(text(settings_button_text).size(11))
        .on_press(Message::ToggleSettingsMenu)
        .padding(Padding::from([4, 8]))
        .style(if settings_menu_open { button::primary } else { button::secondary });

    row![
        map_buttons,
        Space::new().width(Length::Fill),
        settings_button,
        button(text("Quit").size(11))
            .on_press(Message::RequestQuit)
            .padding(Padding::from([4, 8]))
            .style(button::danger),
    ]
    .spacing(4)
    .padding(Padding::from([4, 0]))
    .align_y(Alignment::Center)
    .into()
}

/// Render the settings dropdown menu
pub fn view_settings_menu(dark_mode: bool) -> Element<'static, Message> {
    let theme_label = if dark_mode { "Light Mode" } else { "Dark Mode" };

    let dropdown_content = column![
        button(text(theme_label).size(10))
            .on_press(Message::ToggleDarkMode)
            .padding(Padding::from([4, 12]))
            .width(Length::Fill)
            .style(button::secondary),
    ]
    .spacing(2)
    .width(Length::Fixed(130.0));

    container(dropdown_content)
        .padding(4)
        .style(container::bordered_box)
        .into()
}
