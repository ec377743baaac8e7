//! Modal dialog component
//!
//! Provides the modal overlay used for information, warning and error
//! notices, and for confirming that the user wants to quit.

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Color, Element, Length, Padding};

use crate::Message;

/// Severity of a notice dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    fn accent(&self) -> Color {
        match self {
            NoticeLevel::Info => Color::from_rgb(0.1, 0.45, 0.91),
            NoticeLevel::Warning => Color::from_rgb(0.85, 0.6, 0.0),
            NoticeLevel::Error => Color::from_rgb(0.85, 0.2, 0.2),
        }
    }
}

/// Types of modal dialogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalType {
    /// A message with a single OK button
    Notice {
        level: NoticeLevel,
        title: String,
        body: String,
    },
    /// "Are you sure you want to quit?"
    ConfirmQuit,
}

impl ModalType {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        ModalType::Notice {
            level: NoticeLevel::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        ModalType::Notice {
            level: NoticeLevel::Warning,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        ModalType::Notice {
            level: NoticeLevel::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Render a modal backdrop (semi-transparent overlay that catches clicks)
pub fn view_backdrop() -> Element<'static, Message> {
    button(Space::new())
        .on_press(Message::ModalCancel)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_, _| {
            iced::widget::button::Style::default()
                .with_background(Color::from_rgba(0.0, 0.0, 0.0, 0.5))
        })
        .into()
}

/// Render a modal dialog based on its type
pub fn view_modal(modal_type: &ModalType) -> Element<'_, Message> {
    match modal_type {
        ModalType::Notice { level, title, body } => view_notice(*level, title, body),
        ModalType::ConfirmQuit => view_confirm_quit(),
    }
}

fn view_notice<'a>(level: NoticeLevel, title: &'a str, body: &'a str) -> Element<'a, Message> {
    let content = column![
        text(title).size(18).color(level.accent()),
        Space::new().height(12),
        text(body).size(12),
        Space::new().height(20),
        container(
            button(text("OK").size(11))
                .on_press(Message::ModalConfirm)
                .padding(Padding::from([6, 16]))
                .style(button::primary)
        )
        .align_x(iced::alignment::Horizontal::Right)
        .width(Length::Fill),
    ]
    .width(Length::Fixed(380.0));

    centered(content.into())
}

fn view_confirm_quit() -> Element<'static, Message> {
    let buttons = row![
        Space::new().width(Length::Fill),
        button(text("No").size(11))
            .on_press(Message::ModalCancel)
            .padding(Padding::from([6, 16]))
            .style(button::secondary),
        Space::new().width(8),
        button(text("Yes").size(11))
            .on_press(Message::ModalConfirm)
            .padding(Padding::from([6, 16]))
            .style(button::danger),
    ]
    .align_y(Alignment::Center);

    let content = column![
        text("Quit").size(18),
        Space::new().height(12),
        text("Are you sure you want to quit the application?").size(12),
        Space::new().height(20),
        buttons,
    ]
    .width(Length::Fixed(360.0));

    centered(content.into())
}

/// Center the modal box in the screen
fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    let modal_box = container(content)
        .padding(20)
        .style(container::bordered_box);

    container(modal_box)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(iced::alignment::Horizontal::Center)
        .align_y(iced::alignment::Vertical::Center)
        .into()
}
