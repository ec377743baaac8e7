//! # Palletmap GUI Application
//!
//! Floor-plan view of the warehouse: pallets drawn over a raster image,
//! a properties editor for the selected pallet, the order queue and the
//! I/O lamps. All state lives in the SQLite stores of `pallet_core`.

mod ui;

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use iced::widget::{canvas, column, container, row, rule, scrollable, stack, text};
use iced::{Element, Length, Subscription, Task, Theme};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use pallet_core::{
    AppConfig, IoReading, MoveDirection, Order, Pallet, PalletField, StoreError, StoreResult, Stores,
};

use ui::floor_plan::{FloorPlan, MapImage};
use ui::modal::ModalType;

const DARK_THEME: Theme = Theme::TokyoNight;
const LIGHT_THEME: Theme = Theme::Light;

const SIDE_PANEL_WIDTH: f32 = 360.0;

#[derive(Parser, Debug)]
#[command(version, name = "Palletmap", about = "Warehouse pallet map, order queue and I/O monitor")]
struct Args {
    /// JSON settings file (created with defaults when toggling the theme)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Directory holding pallets.db, ordenes.db and IO.db
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pallet_gui=info,pallet_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path).unwrap_or_else(|e| {
            error!(error = %e, path = %path.display(), "could not read settings, using defaults");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let window_size = (config.window_width, config.window_height);
    let config_path = args.config;

    iced::application(
        move || App::new(config.clone(), config_path.clone()),
        App::update,
        App::view,
    )
    .title("Palletmap")
    .theme(App::theme)
    .subscription(App::subscription)
    .window_size(window_size)
    .antialiasing(true)
    .run()
}

#[derive(Debug, Clone)]
pub enum Message {
    // Map
    OpenMap,
    MapPicked(Option<PathBuf>),
    ClearMap,
    ReloadPallets,
    PalletClicked(i64),

    // Properties
    PropertyEdited(PalletField, String),
    PropertySubmitted(PalletField),

    // I/O
    PollIo,

    // Orders
    SelectOrder(i64),
    AddOrder,
    DeleteOrder,
    MoveOrder(MoveDirection),
    ResetDestinations,

    // Settings / window
    ToggleSettingsMenu,
    ToggleDarkMode,
    RequestQuit,
    ModalConfirm,
    ModalCancel,
}

pub struct App {
    config: AppConfig,
    config_path: Option<PathBuf>,
    stores: Option<Stores>,

    map: Option<MapImage>,
    map_generation: u64,
    pallets: Vec<Pallet>,
    selected_pallet: Option<i64>,
    /// Typed but not yet submitted property values
    drafts: HashMap<PalletField, String>,

    /// Display order
    orders: Vec<Order>,
    selected_order: Option<i64>,

    io_reading: Option<IoReading>,

    modal: Option<ModalType>,
    settings_menu_open: bool,
    dark_mode: bool,
    status: String,
}

impl App {
    fn new(config: AppConfig, config_path: Option<PathBuf>) -> (Self, Task<Message>) {
        let mut app = App {
            dark_mode: config.dark_mode,
            config,
            config_path,
            stores: None,
            map: None,
            map_generation: 0,
            pallets: Vec::new(),
            selected_pallet: None,
            drafts: HashMap::new(),
            orders: Vec::new(),
            selected_order: None,
            io_reading: None,
            modal: None,
            settings_menu_open: false,
            status: "Ready".to_string(),
        };

        match Stores::open(&app.config) {
            Ok(stores) => {
                info!(data_dir = %app.config.data_dir.display(), "opened stores");
                app.stores = Some(stores);
                app.reload_pallets();
                app.reload_orders();
            }
            Err(e) => {
                error!(error = %e, "could not open stores");
                app.modal = Some(ModalType::error("Database unavailable", e.to_string()));
                app.status = "Database unavailable".to_string();
            }
        }

        (app, Task::none())
    }

    fn theme(&self) -> Theme {
        if self.dark_mode { DARK_THEME } else { LIGHT_THEME }
    }

    fn subscription(&self) -> Subscription<Message> {
        // Lamps only refresh while a map is shown
        if self.map.is_some() {
            iced::time::every(self.config.poll_interval()).map(|_| Message::PollIo)
        } else {
            Subscription::none()
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenMap => {
                self.settings_menu_open = false;
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Open floor plan")
                            .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
                            .pick_file()
                            .await
                            .map(|handle| handle.path().to_path_buf())
                    },
                    Message::MapPicked,
                );
            }
            Message::MapPicked(None) => {
                debug!("file dialog cancelled");
            }
            Message::MapPicked(Some(path)) => {
                // The old scene goes away even if the new image fails to load
                self.clear_map();
                self.map_generation += 1;
                match MapImage::load(&path, self.map_generation) {
                    Ok(map) => {
                        info!(path = %path.display(), width = map.size.width, height = map.size.height, "loaded map");
                        self.map = Some(map);
                        self.reload_pallets();
                        self.poll_io();
                        self.status = format!("Loaded {}", path.display());
                        self.modal = Some(ModalType::info("Map loaded", "The floor plan was loaded successfully."));
                    }
                    Err(reason) => {
                        warn!(path = %path.display(), %reason, "could not load map");
                        self.status = format!("Could not load {}", path.display());
                        self.modal = Some(ModalType::warning("Could not load image", reason));
                    }
                }
            }
            Message::ClearMap => self.clear_map(),
            Message::ReloadPallets => {
                self.reload_pallets();
                self.status = format!("{} pallets", self.pallets.len());
            }
            Message::PalletClicked(id) => {
                debug!(id, "pallet clicked");
                self.drafts.clear();
                if self.refresh_pallet(id).is_some() {
                    self.selected_pallet = Some(id);
                    self.status = format!("Pallet {} selected", id);
                }
            }

            Message::PropertyEdited(field, value) => {
                self.drafts.insert(field, value);
            }
            Message::PropertySubmitted(field) => self.submit_property(field),

            Message::PollIo => self.poll_io(),

            Message::SelectOrder(id) => {
                self.selected_order = Some(id);
            }
            Message::AddOrder => self.add_order(),
            Message::DeleteOrder => {
                if let Some(id) = self.selected_order {
                    if self.run("Could not delete order", |s| s.orders.delete(id)).is_some() {
                        self.selected_order = None;
                        self.status = format!("Order {} deleted", id);
                    }
                    self.reload_orders();
                }
            }
            Message::MoveOrder(direction) => {
                if let Some(id) = self.selected_order {
                    if let Some(true) = self.run("Could not move order", |s| s.orders.move_order(id, direction)) {
                        self.status = format!("Order {} moved {:?}", id, direction);
                    }
                    self.reload_orders();
                }
            }
            Message::ResetDestinations => {
                if let Some(orders) = self.run("Could not reset destinations", |s| s.orders.reset_destinations()) {
                    self.status = format!("Renumbered {} orders", orders.len());
                }
                self.reload_orders();
            }

            Message::ToggleSettingsMenu => {
                self.settings_menu_open = !self.settings_menu_open;
            }
            Message::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                self.settings_menu_open = false;
                self.save_settings();
            }
            Message::RequestQuit => {
                self.settings_menu_open = false;
                self.modal = Some(ModalType::ConfirmQuit);
            }
            Message::ModalConfirm => {
                if let Some(ModalType::ConfirmQuit) = self.modal.take() {
                    info!("quitting");
                    return iced::exit();
                }
            }
            Message::ModalCancel => {
                self.modal = None;
            }
        }
        Task::none()
    }

    /// Run a store operation, turning failures into a dialog.
    fn run<T>(&mut self, title: &str, op: impl FnOnce(&mut Stores) -> StoreResult<T>) -> Option<T> {
        let Some(stores) = self.stores.as_mut() else {
            self.modal = Some(ModalType::error(title, "The database is not available."));
            return None;
        };
        match op(stores) {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(title, &e);
                None
            }
        }
    }

    fn report(&mut self, title: &str, e: &StoreError) {
        if e.is_recoverable() {
            warn!(code = e.error_code(), error = %e, "{}", title);
            self.modal = Some(ModalType::warning(title, e.to_string()));
        } else {
            error!(code = e.error_code(), error = %e, "{}", title);
            self.modal = Some(ModalType::error(title, e.to_string()));
        }
        self.status = e.to_string();
    }

    fn reload_pallets(&mut self) {
        if let Some(pallets) = self.run("Could not load pallets", |s| s.pallets.get_all()) {
            debug!(count = pallets.len(), "loaded pallets");
            self.pallets = pallets;
        }
        if self.selected_pallet.is_some_and(|id| !self.pallets.iter().any(|p| p.id == id)) {
            self.selected_pallet = None;
            self.drafts.clear();
        }
    }

    fn reload_orders(&mut self) {
        if let Some(orders) = self.run("Could not load orders", |s| s.orders.list()) {
            self.orders = orders;
        }
        if self.selected_order.is_some_and(|id| !self.orders.iter().any(|o| o.id == id)) {
            self.selected_order = None;
        }
    }

    /// Re-read one pallet into the cache so external edits show up.
    fn refresh_pallet(&mut self, id: i64) -> Option<Pallet> {
        let fresh = self.run("Could not read pallet", |s| s.pallets.get(id))?;
        match fresh {
            Some(pallet) => {
                match self.pallets.iter_mut().find(|p| p.id == id) {
                    Some(slot) => *slot = pallet.clone(),
                    None => self.pallets.push(pallet.clone()),
                }
                Some(pallet)
            }
            None => {
                self.pallets.retain(|p| p.id != id);
                if self.selected_pallet == Some(id) {
                    self.selected_pallet = None;
                    self.drafts.clear();
                }
                warn!(id, "selected pallet no longer exists");
                self.modal = Some(ModalType::warning(
                    "Pallet not found",
                    format!("Pallet {} no longer exists.", id),
                ));
                None
            }
        }
    }

    fn clear_map(&mut self) {
        if self.map.take().is_some() {
            info!("cleared map");
        }
        self.selected_pallet = None;
        self.drafts.clear();
        self.io_reading = None;
        self.status = "Map cleared".to_string();
    }

    fn poll_io(&mut self) {
        let reading = match &self.stores {
            Some(stores) => stores.io.poll(),
            None => IoReading::failed("database not available"),
        };
        self.io_reading = Some(reading);
    }

    fn selected(&self) -> Option<&Pallet> {
        let id = self.selected_pallet?;
        self.pallets.iter().find(|p| p.id == id)
    }

    fn submit_property(&mut self, field: PalletField) {
        let Some(pallet) = self.selected() else {
            return;
        };
        let id = pallet.id;
        let current = pallet.display_value(field);
        let raw = self.drafts.remove(&field).unwrap_or(current);

        let value = match field.parse(&raw) {
            Ok(value) => value,
            Err(e) => {
                self.report("Could not update property", &e);
                return;
            }
        };
        if self
            .run("Could not update property", |s| s.pallets.update_field(id, field, &value))
            .is_none()
        {
            return;
        }

        let mut shown = value.to_string();
        if let Some(slot) = self.pallets.iter_mut().find(|p| p.id == id) {
            if let Err(e) = slot.apply(field, &value) {
                self.report("Could not update property", &e);
                return;
            }
            shown = slot.display_value(field);
        }
        self.status = format!("Pallet {}: {} = {}", id, field, shown);
        self.modal = Some(ModalType::info(
            "Property updated",
            format!("{} of pallet {} is now {}.", field, id, shown),
        ));
    }

    fn add_order(&mut self) {
        // Origin comes from the stored row, not the cached copy
        let fresh = match self.selected_pallet {
            Some(id) => match self.refresh_pallet(id) {
                Some(pallet) => Some(pallet),
                // Already reported
                None => return,
            },
            None => None,
        };
        let target = fresh.map(|p| (p.id, p.position));
        let Some((pallet_id, position)) = target.filter(|(_, position)| *position != 0) else {
            self.modal = Some(ModalType::warning(
                "No pallet selected",
                "Select a pallet with a valid position before adding an order.",
            ));
            return;
        };

        if let Some(order) = self.run("Could not add order", |s| s.orders.insert(position, Some(pallet_id))) {
            self.status = format!("Order {} to destination {}", order.id, order.destination);
            self.selected_order = Some(order.id);
        }
        self.reload_orders();
    }

    fn save_settings(&mut self) {
        self.config.dark_mode = self.dark_mode;
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save(path) {
            self.report("Could not save settings", &e);
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let map_name = self
            .map
            .as_ref()
            .and_then(|m| m.path.file_name())
            .map(|name| name.to_string_lossy().into_owned());

        let mut top = column![
            ui::toolbar::view_header(map_name),
            ui::toolbar::view_toolbar(self.map.is_some(), self.settings_menu_open),
        ]
        .spacing(4);
        if self.settings_menu_open {
            top = top.push(
                container(ui::toolbar::view_settings_menu(self.dark_mode))
                    .align_x(iced::alignment::Horizontal::Right)
                    .width(Length::Fill),
            );
        }

        let map_area: Element<'_, Message> = match &self.map {
            Some(map) => canvas(FloorPlan::new(map, &self.pallets, self.selected_pallet))
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("Open a floor plan image to start.").size(14).color([0.5, 0.5, 0.5]))
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(iced::alignment::Horizontal::Center)
                .align_y(iced::alignment::Vertical::Center)
                .into(),
        };

        let io_state = self.io_reading.as_ref().map(|r| r.state).unwrap_or_default();
        let side_panel = scrollable(
            column![
                ui::properties_panel::view_properties_panel(self.selected(), &self.drafts),
                rule::horizontal(1),
                ui::orders_panel::view_orders_panel(&self.orders, self.selected_order),
                rule::horizontal(1),
                text("I/O").size(14),
                ui::io_panel::view_io_panel(io_state),
            ]
            .spacing(12)
            .padding(8),
        )
        .width(Length::Fixed(SIDE_PANEL_WIDTH));

        let content = column![
            top,
            rule::horizontal(1),
            row![map_area, rule::vertical(1), side_panel].height(Length::Fill),
            rule::horizontal(1),
            ui::status_bar::view_status_bar(
                &self.config.data_dir,
                self.map.as_ref().map(|m| &m.path),
                self.io_reading.as_ref(),
                &self.status,
            ),
        ]
        .padding(8);

        match &self.modal {
            Some(modal) => stack![content, ui::modal::view_backdrop(), ui::modal::view_modal(modal)].into(),
            None => content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pallet_core::store::PalletStore;
    use pallet_core::NewPallet;
    use std::fs;
    use ui::modal::NoticeLevel;

    fn app_in(name: &str) -> (App, PathBuf) {
        let dir = std::env::temp_dir().join(format!("palletmap_gui_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let config = AppConfig {
            data_dir: dir.clone(),
            ..AppConfig::default()
        };
        let (app, _) = App::new(config, None);
        assert!(app.stores.is_some());
        (app, dir)
    }

    fn is_warning(modal: &Option<ModalType>) -> bool {
        matches!(modal, Some(ModalType::Notice { level: NoticeLevel::Warning, .. }))
    }

    #[test]
    fn test_click_rereads_pallet_from_store() {
        let (mut app, dir) = app_in("click");
        let external = PalletStore::open(&app.config.pallets_path()).unwrap();
        let pallet = external
            .insert(&NewPallet { position: 4, ..NewPallet::default() })
            .unwrap();
        let _ = app.update(Message::ReloadPallets);

        // Another writer changes the row after the cache was filled
        external.edit(pallet.id, PalletField::Position, "9").unwrap();
        external.edit(pallet.id, PalletField::Quality, "C").unwrap();

        let _ = app.update(Message::PalletClicked(pallet.id));
        let selected = app.selected().unwrap();
        assert_eq!(selected.position, 9);
        assert_eq!(selected.quality, "C");

        drop(app);
        drop(external);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_click_on_deleted_pallet_warns() {
        let (mut app, dir) = app_in("deleted");
        let external = PalletStore::open(&app.config.pallets_path()).unwrap();
        let pallet = external.insert(&NewPallet::default()).unwrap();
        let _ = app.update(Message::ReloadPallets);
        external.delete(pallet.id).unwrap();

        let _ = app.update(Message::PalletClicked(pallet.id));
        assert_eq!(app.selected_pallet, None);
        assert!(app.pallets.is_empty());
        assert!(is_warning(&app.modal));

        drop(app);
        drop(external);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_add_order_uses_current_position() {
        let (mut app, dir) = app_in("add_order");
        let external = PalletStore::open(&app.config.pallets_path()).unwrap();
        let pallet = external
            .insert(&NewPallet { position: 4, ..NewPallet::default() })
            .unwrap();
        let _ = app.update(Message::ReloadPallets);
        let _ = app.update(Message::PalletClicked(pallet.id));

        external.edit(pallet.id, PalletField::Position, "6").unwrap();
        let _ = app.update(Message::AddOrder);

        assert_eq!(app.orders.len(), 1);
        assert_eq!(app.orders[0].origin, 6);
        assert_eq!(app.orders[0].pallet_id, Some(pallet.id));
        assert_eq!(app.orders[0].destination, 1);

        // Position cleared externally: no order is created
        external.edit(pallet.id, PalletField::Position, "0").unwrap();
        let _ = app.update(Message::AddOrder);
        assert_eq!(app.orders.len(), 1);
        assert!(is_warning(&app.modal));

        drop(app);
        drop(external);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_submitted_property_updates_cache_and_store() {
        let (mut app, dir) = app_in("submit");
        let external = PalletStore::open(&app.config.pallets_path()).unwrap();
        let pallet = external.insert(&NewPallet::default()).unwrap();
        let _ = app.update(Message::ReloadPallets);
        let _ = app.update(Message::PalletClicked(pallet.id));

        let _ = app.update(Message::PropertyEdited(PalletField::Priority, "5".to_string()));
        let _ = app.update(Message::PropertySubmitted(PalletField::Priority));
        assert_eq!(app.selected().unwrap().priority, 5);
        assert_eq!(external.get(pallet.id).unwrap().unwrap().priority, 5);
        assert!(matches!(app.modal, Some(ModalType::Notice { level: NoticeLevel::Info, .. })));

        let weight = app.selected().unwrap().weight;
        let _ = app.update(Message::PropertyEdited(PalletField::Weight, "heavy".to_string()));
        let _ = app.update(Message::PropertySubmitted(PalletField::Weight));
        assert!(is_warning(&app.modal));
        assert_eq!(app.selected().unwrap().weight, weight);
        assert_eq!(external.get(pallet.id).unwrap().unwrap().weight, weight);

        drop(app);
        drop(external);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_map_load_clears_previous_map() {
        let (mut app, dir) = app_in("map");
        let png = dir.join("plan.png");
        ::image::RgbImage::new(8, 6).save(&png).unwrap();

        let _ = app.update(Message::MapPicked(Some(png)));
        assert_eq!(app.map.as_ref().map(|m| m.size), Some(iced::Size::new(8.0, 6.0)));
        assert!(app.io_reading.is_some());

        let _ = app.update(Message::MapPicked(Some(dir.join("missing.png"))));
        assert!(app.map.is_none());
        assert!(app.io_reading.is_none());
        assert_eq!(app.selected_pallet, None);
        assert!(is_warning(&app.modal));

        drop(app);
        let _ = fs::remove_dir_all(&dir);
    }
}
