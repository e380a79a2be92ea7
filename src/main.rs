mod backend;
mod config;
mod constants;
mod drag;
mod drop_zone;
mod error;
mod item;
mod loader;
mod paths;
mod registry;
mod session;
mod store;
mod task;

use backend::{DeskBackend, HttpBackend, UnavailableBackend};
use config::AppConfig;
use constants::{
    COLOR_CONTAINER_BG, COLOR_CONTAINER_DRAG_OVER_BG, COLOR_CONTAINER_STROKE, COLOR_ERROR_TEXT,
    COLOR_HEADING, COLOR_ICON, COLOR_ITEM_HOVER_BG, COLOR_ITEM_HOVER_STROKE, COLOR_LABEL,
    COLOR_TOOLBAR_BG, FILE_FOLD_RATIO, FOLDER_CORNER_RADIUS, FOLDER_TAB_HEIGHT,
    FOLDER_TAB_WIDTH_RATIO, ICON_MARGIN, ICON_SIZE, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH,
    ITEM_CORNER_RADIUS, LABEL_FONT_SIZE,
};
use drag::{DragController, GestureState};
use drop_zone::{DropPhase, DropZone, DroppedFile};
use eframe::egui::{
    self, pos2, vec2, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Shape, Stroke, Vec2,
};
use item::CanvasItem;
use loader::DirectoryLoader;
use paths::AppPaths;
use registry::ItemRegistry;
use session::SessionContext;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use store::{FileStore, MemoryStore, WorkspaceStore};

/// How often to wake up while a request is outstanding.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Cascloud Desk",
        options,
        Box::new(|cc| Ok(Box::new(DeskApp::new(cc)))),
    )
}

/// Snapshot of what is needed to draw one item, taken before input can move it.
struct ItemView {
    id: String,
    name: String,
    is_folder: bool,
    tint: Color32,
}

impl From<&CanvasItem> for ItemView {
    fn from(item: &CanvasItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.entry.name.clone(),
            is_folder: item.is_folder(),
            tint: item.icon_tint(),
        }
    }
}

struct DeskApp {
    session: SessionContext,
    registry: ItemRegistry,
    loader: DirectoryLoader,
    drag: DragController,
    drop_zone: DropZone,
    container_size: Vec2,
}

impl DeskApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let paths = AppPaths::from_project_dirs();
        if let Some(paths) = &paths {
            if let Err(err) = paths.ensure_dirs_exist() {
                log::warn!("Could not create application directories: {err}");
            }
        } else {
            log::warn!("No home directory; running without persisted state");
        }

        let config = AppConfig::load(paths.as_ref().map(|p| p.config_file()).as_deref());
        log::info!("Using backend {}", config.backend_url);

        let store: Rc<dyn WorkspaceStore> = match &paths {
            Some(paths) => Rc::new(FileStore::new(paths.workspace_file())),
            None => Rc::new(MemoryStore::default()),
        };
        let session = SessionContext::seeded(store.as_ref());
        if let Some(user_id) = &config.user_id {
            session.set_user_id(user_id);
        }

        let backend: Arc<dyn DeskBackend> = match HttpBackend::new(&config) {
            Ok(backend) => Arc::new(backend),
            Err(err) => {
                log::error!("{err}; requests will fail until restart");
                Arc::new(UnavailableBackend::new(&err))
            }
        };
        let mut loader = DirectoryLoader::new(Arc::clone(&backend), session.clone(), Rc::clone(&store));
        loader.load_directory(None);

        Self {
            session,
            registry: ItemRegistry::new(),
            loader,
            drag: DragController::new(config.container_size()),
            drop_zone: DropZone::new(backend, store),
            container_size: config.container_size(),
        }
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        if self.loader.poll(&mut self.registry) {
            self.drag.reset();
        }
        if self.drop_zone.poll(&mut self.registry) > 0 {
            ctx.request_repaint();
        }
        if self.loader.is_fetching() || self.drop_zone.phase() == DropPhase::Uploading {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }

    fn pick_and_upload(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_file() {
            // Errors are already logged by the drop zone.
            let _ = self
                .drop_zone
                .drop(vec![DroppedFile::from_path(path)], Pos2::ZERO);
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::default()
                    .fill(COLOR_TOOLBAR_BG)
                    .inner_margin(4.0)
                    .outer_margin(0.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    if ui
                        .add(
                            egui::Button::new(RichText::new("📤").size(24.0))
                                .min_size(Vec2::new(32.0, 32.0))
                                .frame(false),
                        )
                        .on_hover_text("Upload File")
                        .clicked()
                    {
                        self.pick_and_upload();
                    }
                    if ui
                        .add(
                            egui::Button::new(RichText::new("🔄").size(24.0))
                                .min_size(Vec2::new(32.0, 32.0))
                                .frame(false),
                        )
                        .on_hover_text("Reload Workspace")
                        .clicked()
                    {
                        self.loader.load_directory(None);
                    }

                    ui.separator();
                    let workspace = match self.loader.workspace_id() {
                        "" => "no workspace".to_string(),
                        id => format!("workspace {id}"),
                    };
                    ui.label(RichText::new(workspace).color(Color32::LIGHT_GRAY));
                    let user_id = self.session.get().user_id;
                    if !user_id.is_empty() {
                        ui.label(RichText::new(format!("user {user_id}")).color(Color32::GRAY));
                    }

                    if !self.loader.is_loading() {
                        ui.label(
                            RichText::new(format!(
                                "{} folders · {} files",
                                self.registry.folder_count(),
                                self.registry.file_count()
                            ))
                            .color(Color32::GRAY),
                        );
                    }

                    if self.drop_zone.phase() == DropPhase::Uploading {
                        ui.separator();
                        ui.spinner();
                        let label = match self.drop_zone.uploads_in_flight() {
                            1 => "Uploading…".to_string(),
                            n => format!("Uploading {n} files…"),
                        };
                        ui.label(RichText::new(label).color(Color32::LIGHT_GRAY));
                    }

                    if let Some(err) = self.loader.last_error() {
                        ui.separator();
                        ui.label(RichText::new(err.to_string()).color(COLOR_ERROR_TEXT));
                        if ui.button("Retry").clicked() {
                            self.loader.retry();
                        }
                    }
                });
            });
    }

    fn handle_file_hover_and_drop(&mut self, ctx: &egui::Context, container: Rect) {
        let (hovering, dropped, pointer) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
                i.pointer.hover_pos(),
            )
        });
        // Some platforms report no pointer position during an OS-level drag.
        let over_container = pointer.map_or(true, |p| container.contains(p));

        if hovering && over_container {
            if !self.drop_zone.is_drag_over() {
                self.drop_zone.drag_enter();
            }
        } else if self.drop_zone.is_drag_over() && dropped.is_empty() {
            self.drop_zone.drag_leave();
        }

        if dropped.is_empty() {
            return;
        }
        if !over_container {
            log::debug!("Ignoring {} file(s) dropped outside the desk", dropped.len());
            self.drop_zone.drag_leave();
            return;
        }

        let at = pointer
            .map(|p| (p - container.min).to_pos2())
            .map(|p| pos2(p.x.clamp(0.0, container.width()), p.y.clamp(0.0, container.height())))
            .unwrap_or(Pos2::ZERO);
        let files = dropped.iter().map(DroppedFile::from).collect();
        // Errors are already logged by the drop zone.
        let _ = self.drop_zone.drop(files, at);
    }

    fn show_desk(&mut self, ui: &mut egui::Ui, dt: f32) -> Rect {
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("Workspace").color(COLOR_HEADING).size(28.0));
        });
        ui.add_space(8.0);

        let (container, _) = ui
            .vertical_centered(|ui| ui.allocate_exact_size(self.container_size, Sense::hover()))
            .inner;
        let painter = ui.painter_at(container);
        let background = if self.drop_zone.is_drag_over() {
            COLOR_CONTAINER_DRAG_OVER_BG
        } else {
            COLOR_CONTAINER_BG
        };
        painter.rect(
            container,
            egui::Rounding::same(6.0),
            background,
            Stroke::new(1.0, COLOR_CONTAINER_STROKE),
        );

        if self.loader.is_loading() && self.registry.is_empty() {
            painter.text(
                container.center(),
                Align2::CENTER_CENTER,
                "Loading…",
                FontId::proportional(18.0),
                COLOR_LABEL,
            );
        }

        let origin = container.min.to_vec2();
        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        let any_down = ui.input(|i| i.pointer.any_down());

        let views: Vec<(usize, ItemView)> = self
            .registry
            .render_order()
            .into_iter()
            .map(|index| (index, ItemView::from(&self.registry.items()[index])))
            .collect();

        for (index, view) in views {
            let rect = self.registry.items()[index].rect().translate(origin);
            let response = ui.interact(rect, egui::Id::new(("desk-item", &view.id)), Sense::drag());

            if response.drag_started_by(egui::PointerButton::Primary) {
                self.drag.pointer_down(&mut self.registry, &view.id);
            }

            let dragging = self.drag.state_of(&view.id) == GestureState::Dragging;
            if dragging {
                if response.drag_stopped() {
                    self.drag.pointer_up(&mut self.registry);
                } else if escape || !any_down {
                    // Focus loss or a swallowed release never reports a stop.
                    self.drag.pointer_cancel(&mut self.registry);
                } else if response.dragged_by(egui::PointerButton::Primary) {
                    self.drag
                        .pointer_move(&mut self.registry, response.drag_delta(), dt);
                }
            }

            let Some(item) = self.registry.get(&view.id) else {
                continue;
            };
            let rect = item.rect().translate(origin);
            let elevated = self.registry.elevated().is_some_and(|e| e.id() == view.id);
            let highlighted = response.hovered() || elevated;
            paint_item(&painter, rect, &view, highlighted);
        }

        container
    }
}

impl eframe::App for DeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.unstable_dt).max(0.0);

        self.poll_background(ctx);
        self.drag.tick(&mut self.registry, dt);
        if self.drag.is_gliding() {
            ctx.request_repaint();
        }

        self.show_toolbar(ctx);

        let mut container = Rect::NOTHING;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both()
                .id_salt("desk")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    container = self.show_desk(ui, dt);
                });
        });

        self.handle_file_hover_and_drop(ctx, container);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.loader.shutdown();
        self.drop_zone.shutdown();
    }
}

fn paint_item(painter: &egui::Painter, rect: Rect, view: &ItemView, highlighted: bool) {
    if highlighted {
        painter.rect(
            rect,
            egui::Rounding::same(ITEM_CORNER_RADIUS),
            COLOR_ITEM_HOVER_BG,
            Stroke::new(1.0, COLOR_ITEM_HOVER_STROKE),
        );
    }

    let icon_rect = Rect::from_center_size(
        pos2(rect.center().x, rect.min.y + ICON_MARGIN + ICON_SIZE / 2.0),
        Vec2::splat(ICON_SIZE),
    );
    if view.is_folder {
        paint_folder_glyph(painter, icon_rect, view.tint);
    } else {
        paint_file_glyph(painter, icon_rect, view.tint);
    }

    let wrap_width = rect.width() - 2.0 * ICON_MARGIN;
    let galley = painter.layout(
        view.name.clone(),
        FontId::proportional(LABEL_FONT_SIZE),
        COLOR_LABEL,
        wrap_width,
    );
    let label_pos = pos2(
        rect.center().x - galley.size().x / 2.0,
        icon_rect.max.y + ICON_MARGIN,
    );
    painter.with_clip_rect(rect).galley(label_pos, galley, COLOR_LABEL);
}

fn paint_folder_glyph(painter: &egui::Painter, icon_rect: Rect, tint: Color32) {
    let body = Rect::from_min_max(
        icon_rect.left_top() + vec2(0.0, FOLDER_TAB_HEIGHT * 2.0),
        icon_rect.right_bottom() - vec2(0.0, FOLDER_TAB_HEIGHT),
    );
    painter.rect_filled(body, egui::Rounding::same(FOLDER_CORNER_RADIUS), tint);
    painter.rect_filled(
        Rect::from_min_max(
            body.left_top() - vec2(0.0, FOLDER_TAB_HEIGHT),
            body.left_top() + vec2(body.width() * FOLDER_TAB_WIDTH_RATIO, 0.0),
        ),
        egui::Rounding::same(1.0),
        tint,
    );
    painter.rect_stroke(
        body,
        egui::Rounding::same(FOLDER_CORNER_RADIUS),
        Stroke::new(1.0, COLOR_ICON),
    );
}

fn paint_file_glyph(painter: &egui::Painter, icon_rect: Rect, tint: Color32) {
    let sheet = icon_rect.shrink2(vec2(icon_rect.width() * 0.15, 0.0));
    let fold = sheet.width() * FILE_FOLD_RATIO;
    let outline = vec![
        sheet.left_top(),
        sheet.right_top() - vec2(fold, 0.0),
        sheet.right_top() + vec2(0.0, fold),
        sheet.right_bottom(),
        sheet.left_bottom(),
    ];
    painter.add(Shape::convex_polygon(
        outline,
        Color32::WHITE,
        Stroke::new(1.5, COLOR_ICON),
    ));
    painter.add(Shape::convex_polygon(
        vec![
            sheet.right_top() - vec2(fold, 0.0),
            sheet.right_top() + vec2(0.0, fold),
            sheet.right_top() + vec2(-fold, fold),
        ],
        tint,
        Stroke::new(1.0, COLOR_ICON),
    ));

    for row in 0..3 {
        let y = sheet.center().y + row as f32 * 5.0;
        painter.line_segment(
            [pos2(sheet.min.x + 5.0, y), pos2(sheet.max.x - 5.0, y)],
            Stroke::new(1.5, COLOR_ICON),
        );
    }
}
