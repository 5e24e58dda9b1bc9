// main.rs — 桌面外壳：窗口、事件循环、菜单和状态栏
//
// 鼠标/触摸拖拽 -> 平移手势，模拟姿态源 -> 设备姿态，二者都交给 PanoramaView。

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

use panorama_view::config::ViewerConfig;
use panorama_view::error::Result;
use panorama_view::gesture::{PanEvent, PanRecognizer};
use panorama_view::i18n::{self, tr, tr_with};
use panorama_view::loader::{start_load_image, LoadResult};
use panorama_view::motion::{AttitudeSource, SimulatedAttitude, Unsupported};
use panorama_view::renderer::Renderer;
use panorama_view::scene::SphereNode;
use panorama_view::{InputMode, PanoramaView, ScreenOrientation};

use glam::Vec2;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

const LANGUAGES: [(&str, &str); 2] = [("en", "English"), ("fr", "Français")];
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// UI-only state; camera orientation lives in `PanoramaView`.
struct UiState {
    show_fps: bool,
    is_loading: bool,
    is_fullscreen: bool,
    motion_supported: bool,
    motion_running: bool,
    current_lang: String,
    fps: f32,
}

enum UiAction {
    OpenImage(PathBuf),
    ToggleFullscreen,
    ToggleFps,
    ToggleMotion,
    ClearAttitude,
    SetScreen(ScreenOrientation),
    SetLang(String),
    Exit,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from_args();
    if let Err(e) = run(config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    i18n::init(config.lang.clone());

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let mut view = PanoramaView::new(SphereNode::new(config.radius, config.segments), config.fov);
    let size = window.inner_size();
    view.set_viewport(size.width as f32, size.height as f32);

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), view.scene().sphere()))?;

    // 能力检测只在启动时做一次；不支持时整个会话只能拖拽
    let mut attitude: Box<dyn AttitudeSource> = if config.pan_only {
        Box::new(Unsupported)
    } else {
        Box::new(SimulatedAttitude::new(config.sample_rate))
    };
    let motion_supported = attitude.is_available();
    if config.motion && motion_supported {
        attitude.start(Instant::now());
    }

    let mut ui = UiState {
        show_fps: false,
        is_loading: false,
        is_fullscreen: false,
        motion_supported,
        motion_running: attitude.is_running(),
        current_lang: i18n::current_lang(),
        fps: 0.0,
    };

    let mut pan = PanRecognizer::new();
    let mut cursor = Vec2::ZERO;

    let mut last_frame_time = Instant::now();
    let mut frame_count = 0u32;

    // 异步加载通道
    let (tx, rx): (Sender<LoadResult>, Receiver<LoadResult>) = channel();
    if let Some(path) = config.image.clone() {
        ui.is_loading = true;
        start_load_image(path, tx.clone());
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(result) = rx.try_recv() {
            ui.is_loading = false;
            if let Ok(rgba) = result {
                view.set_image(&rgba);
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed && !pan.is_tracking() {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        view.set_viewport(new_size.width as f32, new_size.height as f32);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        view.set_viewport(new_inner_size.width as f32, new_inner_size.height as f32);
                    }

                    WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                        let action = match input.virtual_keycode {
                            Some(VirtualKeyCode::O) => pick_image().map(UiAction::OpenImage),
                            Some(VirtualKeyCode::F11) => Some(UiAction::ToggleFullscreen),
                            Some(VirtualKeyCode::M) => Some(UiAction::ToggleMotion),
                            Some(VirtualKeyCode::C) => Some(UiAction::ClearAttitude),
                            _ => None,
                        };
                        if let Some(action) = action {
                            apply(action, &mut view, attitude.as_mut(), &mut ui, &window, &tx, control_flow);
                        }
                    }

                    // 鼠标拖拽
                    WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                        let ev = match state {
                            ElementState::Pressed => pan.press(cursor),
                            ElementState::Released => pan.release(),
                        };
                        dispatch_pan(&mut view, ev);
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = Vec2::new(position.x as f32, position.y as f32);
                        dispatch_pan(&mut view, pan.moved(cursor));
                    }

                    WindowEvent::CursorLeft { .. } if !pan.is_touching() => {
                        dispatch_pan(&mut view, pan.cancel());
                    }

                    WindowEvent::Focused(false) => {
                        dispatch_pan(&mut view, pan.cancel());
                    }

                    // 触摸：只跟踪第一根手指
                    WindowEvent::Touch(touch) => {
                        let at = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                        let ev = match touch.phase {
                            TouchPhase::Started => pan.touch_started(touch.id, at),
                            TouchPhase::Moved => pan.touch_moved(touch.id, at),
                            TouchPhase::Ended => pan.touch_ended(touch.id),
                            TouchPhase::Cancelled => pan.touch_cancelled(touch.id),
                        };
                        dispatch_pan(&mut view, ev);
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                        };
                        let camera = view.camera_mut();
                        camera.fov = (camera.fov - scroll * 2.5).clamp(20.0, 110.0);
                    }

                    WindowEvent::DroppedFile(path) => {
                        apply(UiAction::OpenImage(path), &mut view, attitude.as_mut(), &mut ui, &window, &tx, control_flow);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                frame_count += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last_frame_time).as_secs_f32();
                if elapsed >= 1.0 {
                    ui.fps = frame_count as f32 / elapsed;
                    frame_count = 0;
                    last_frame_time = now;
                }

                renderer.sync_texture(view.scene());
                renderer.update_camera(view.camera());

                let mut actions = Vec::new();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &view, &ui, &mut actions);
                });

                for action in actions {
                    apply(action, &mut view, attitude.as_mut(), &mut ui, &window, &tx, control_flow);
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory, exiting");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::warn!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                // 姿态源按自己的频率出样，与手势事件互不等待
                if let Some(q) = attitude.poll(Instant::now()) {
                    view.handle_device_attitude(q);
                }
                window.request_redraw();
            }

            _ => {}
        }
    })
}

fn dispatch_pan(view: &mut PanoramaView, ev: Option<PanEvent>) {
    if let Some(ev) = ev {
        view.handle_pan(ev.phase, ev.translation);
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&tr("file.filter.images"), &IMAGE_EXTENSIONS)
        .pick_file()
}

fn apply(
    action: UiAction,
    view: &mut PanoramaView,
    attitude: &mut dyn AttitudeSource,
    ui: &mut UiState,
    window: &Window,
    tx: &Sender<LoadResult>,
    control_flow: &mut ControlFlow,
) {
    match action {
        UiAction::OpenImage(path) => {
            ui.is_loading = true;
            start_load_image(path, tx.clone());
        }
        UiAction::ToggleFullscreen => {
            ui.is_fullscreen = !ui.is_fullscreen;
            window.set_fullscreen(ui.is_fullscreen.then(|| Fullscreen::Borderless(None)));
        }
        UiAction::ToggleFps => ui.show_fps = !ui.show_fps,
        UiAction::ToggleMotion => {
            if !ui.motion_supported {
                log::warn!("{}", tr("motion.unavailable"));
            } else if attitude.is_running() {
                // 停止采样不会清除最后一次姿态
                attitude.stop();
            } else {
                attitude.start(Instant::now());
            }
            ui.motion_running = attitude.is_running();
        }
        UiAction::ClearAttitude => {
            view.clear_device_attitude();
        }
        UiAction::SetScreen(screen) => view.set_screen_orientation(screen),
        UiAction::SetLang(lang) => {
            i18n::init(lang.clone());
            ui.current_lang = lang;
            window.set_title(&tr("app.title"));
        }
        UiAction::Exit => *control_flow = ControlFlow::Exit,
    }
}

fn draw_ui(ctx: &egui::Context, view: &PanoramaView, ui_state: &UiState, actions: &mut Vec<UiAction>) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    if let Some(path) = pick_image() {
                        actions.push(UiAction::OpenImage(path));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                let label = if ui_state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(label).clicked() {
                    actions.push(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }

                ui.separator();
                ui.menu_button(tr("view.screen_orientation"), |ui| {
                    let current = view.display().screen;
                    for screen in ScreenOrientation::ALL {
                        if ui.radio(current == screen, tr(screen.label_key())).clicked() {
                            actions.push(UiAction::SetScreen(screen));
                            ui.close_menu();
                        }
                    }
                });

                ui.separator();
                let mut show_fps = ui_state.show_fps;
                if ui.checkbox(&mut show_fps, tr("view.show_fps")).clicked() {
                    actions.push(UiAction::ToggleFps);
                    ui.close_menu();
                }
            });

            ui.menu_button(tr("menu.motion"), |ui| {
                if !ui_state.motion_supported {
                    ui.label(tr("motion.unavailable"));
                    return;
                }
                let label = if ui_state.motion_running {
                    tr("motion.stop")
                } else {
                    tr("motion.start")
                };
                if ui.button(label).clicked() {
                    actions.push(UiAction::ToggleMotion);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(view.mode() == InputMode::Motion, egui::Button::new(tr("motion.clear")))
                    .clicked()
                {
                    actions.push(UiAction::ClearAttitude);
                    ui.close_menu();
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in LANGUAGES {
                    if ui.radio(ui_state.current_lang == code, name).clicked() {
                        actions.push(UiAction::SetLang(code.to_string()));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui_state.is_loading {
                ui.label(egui::RichText::new(tr("status.loading_image")).color(egui::Color32::YELLOW));
                ui.label("|");
            } else if view.scene().texture().is_none() {
                ui.label(tr("status.no_image"));
                ui.label("|");
            }

            let mode = match view.mode() {
                InputMode::Pan => tr("status.mode.pan"),
                InputMode::Motion => tr("status.mode.motion"),
            };
            ui.label(format!("{} {}", tr("status.mode_prefix"), mode));
            ui.label("|");
            ui.label(format!(
                "{} {}",
                tr("status.screen_prefix"),
                tr(view.display().screen.label_key())
            ));
            ui.label("|");

            let camera = view.camera();
            let (yaw, pitch, _) = camera.orientation.to_euler(glam::EulerRot::YXZ);
            ui.label(format!("FOV: {:.1}°", camera.fov));
            ui.label("|");
            ui.label(format!("Yaw: {:.1}°", yaw.to_degrees()));
            ui.label("|");
            ui.label(format!("Pitch: {:.1}°", pitch.to_degrees()));

            if view.mode() == InputMode::Motion {
                let offset = view.engine().cumulative_offset();
                ui.label("|");
                ui.label(tr_with(
                    "status.offset",
                    &[
                        ("pitch", format!("{:.1}", offset.x.to_degrees())),
                        ("yaw", format!("{:.1}", offset.y.to_degrees())),
                    ],
                ));
            }

            if ui_state.show_fps {
                ui.label("|");
                ui.label(egui::RichText::new(format!("FPS: {:.1}", ui_state.fps)).color(egui::Color32::GREEN));
            }
        });
    });
}
