//! Flow control and application event loop.
//!
//! This module wires the host (a winit window, native or in a browser canvas)
//! to the effects pipeline. winit redraw requests drive the frame tick, size
//! and scale changes go to the resize handlers, mouse input goes to the orbit
//! controls, and finished asset loads come back as user events.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the GPU [`Context`] (asynchronously
//!    on the web, where it arrives as [`FlowEvent::Initialized`])
//! 2. the [`RenderContext`] is built and asset loads are started
//! 3. every `RedrawRequested` runs one [`FrameUpdater::tick`], which asks
//!    for the next redraw itself
//! 4. `FlowEvent::AssetLoaded` grafts finished assets into the scene

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    camera::OrbitControls,
    context::Context,
    effects::{self, FrameScheduler, FrameUpdater, RenderContext, ViewportState},
    error::Result,
    render::GraphicsContext,
    resources::{AssetLoader, GltfLoader, LoadedAsset},
    settings::Settings,
    time::UniformClock,
};

/// Which part of the scene a loaded asset is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    /// Carries the fire targets.
    Scene,
    /// Rendered toon-shaded with outlines.
    Outlined,
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Context),
    AssetLoaded {
        slot: AssetSlot,
        result: Result<LoadedAsset>,
    },
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::AssetLoaded { slot, result } => f
                .debug_struct("AssetLoaded")
                .field("slot", slot)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

/// Schedules the next tick by asking the window for a redraw.
struct RedrawScheduler(Arc<Window>);

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

pub(crate) struct AppState {
    gpu: Context,
    scene: RenderContext,
    controls: OrbitControls,
    updater: FrameUpdater<UniformClock>,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
}

impl AppState {
    fn new(mut gpu: Context, settings: &Settings) -> Result<Self> {
        let window = gpu.window().clone();
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<u32>(scale);
        let viewport = ViewportState::new(
            logical.width,
            logical.height,
            scale as f32,
            settings.max_pixel_ratio,
        );
        let mut scene = RenderContext::new(settings, viewport)?;
        gpu.set_shadows(settings.shadows);
        effects::on_resize(&mut scene, &mut gpu, logical.width, logical.height);
        Ok(Self {
            gpu,
            scene,
            controls: OrbitControls::new(&settings.camera),
            updater: FrameUpdater::new(UniformClock::new()),
            dragging: false,
            cursor: None,
        })
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    settings: Settings,
    loader: Box<dyn AssetLoader>,
    state: Option<AppState>,
    started: bool,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, settings: Settings) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            settings,
            loader: Box::new(GltfLoader),
            state: None,
            started: false,
        })
    }

    fn install(&mut self, event_loop: &ActiveEventLoop, gpu: Context) {
        let window = gpu.window().clone();
        match AppState::new(gpu, &self.settings) {
            Ok(state) => {
                self.state = Some(state);
                self.start_loads();
                window.request_redraw();
            }
            Err(e) => {
                log::error!("Cannot set up the scene: {}", e);
                event_loop.exit();
            }
        }
    }

    /// Kicks off every configured asset load. Completion arrives later as a
    /// `FlowEvent::AssetLoaded`.
    fn start_loads(&self) {
        let assets = [
            (AssetSlot::Scene, self.settings.scene_asset.as_deref()),
            (AssetSlot::Outlined, self.settings.outline_asset.as_deref()),
        ];
        for (slot, path) in assets {
            let Some(path) = path else {
                continue;
            };
            log::info!("loading {} for {:?}", path, slot);
            let load = self.loader.load(path);
            let proxy = self.proxy.clone();
            let deliver = async move {
                let result = load.await;
                if proxy
                    .send_event(FlowEvent::AssetLoaded { slot, result })
                    .is_err()
                {
                    log::warn!("event loop closed before {:?} finished loading", slot);
                }
            };

            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(deliver);

            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(deliver);
        }
    }

    fn on_asset(&mut self, slot: AssetSlot, result: Result<LoadedAsset>) {
        let Some(state) = &mut self.state else {
            return;
        };
        let asset = match result {
            Ok(asset) => asset,
            Err(e) => {
                log::error!("{:?} asset failed: {}", slot, e);
                return;
            }
        };
        match slot {
            AssetSlot::Scene => {
                if let Err(e) = state.scene.attach_scene_asset(asset, &self.settings) {
                    log::error!("scene attached without fire: {}", e);
                }
            }
            AssetSlot::Outlined => {
                match state.scene.attach_outlined_asset(asset, &self.settings) {
                    Ok(pairs) => log::info!("{} outlines added", pairs.len()),
                    Err(e) => log::error!("outlined asset not attached: {}", e),
                }
            }
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("campfire");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes =
                        window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::warn!("no #{} element, letting winit create a canvas", CANVAS_ID),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self
                .async_runtime
                .block_on(Context::new(window, &self.settings))
            {
                Ok(gpu) => self.install(event_loop, gpu),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let settings = self.settings.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window, &settings).await {
                    Ok(gpu) => {
                        if proxy.send_event(FlowEvent::Initialized(gpu)).is_err() {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(gpu) => self.install(event_loop, gpu),
            FlowEvent::AssetLoaded { slot, result } => self.on_asset(slot, result),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.controls.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let logical = size.to_logical::<u32>(state.gpu.window().scale_factor());
                effects::on_resize(&mut state.scene, &mut state.gpu, logical.width, logical.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                effects::on_scale_factor(&mut state.scene, &mut state.gpu, scale_factor as f32);
            }
            WindowEvent::RedrawRequested => {
                let mut scheduler = RedrawScheduler(state.gpu.window().clone());
                state.updater.tick(
                    &mut state.scene,
                    &mut state.controls,
                    &mut state.gpu,
                    &mut scheduler,
                );
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => state.dragging = true,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => state.dragging = false,
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (state.dragging, state.cursor) {
                    state
                        .controls
                        .handle_mouse(position.x - last.x, position.y - last.y);
                }
                state.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                state.dragging = false;
                state.cursor = None;
            }
            _ => {}
        }
    }
}

/// Opens a window and runs the campfire scene until it is closed.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, settings)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
