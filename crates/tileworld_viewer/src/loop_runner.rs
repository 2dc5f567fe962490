use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tileworld::{
    load_world_map, Camera2D, Color, MapLoadError, SheetPalette, TileWorld, TileWorldError, Vec2,
};
use tracing::{debug, info, trace, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::{ConfigError, ViewerConfig, MAP_ENV_VAR};
use crate::input::{ActionStates, InputAction};
use crate::renderer::Renderer;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load world map: {0}")]
    Map(#[from] MapLoadError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create viewer window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] pixels::Error),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TileProbe {
    position: Vec2,
    tile: u16,
    collision: Option<Color>,
}

pub fn run_viewer(config: ViewerConfig) -> Result<(), ViewerError> {
    let map_path = config
        .map_path
        .clone()
        .ok_or(ConfigError::MissingMapPath {
            env_var: MAP_ENV_VAR,
        })?;
    let world = load_world_map(&map_path)?;

    let event_loop = EventLoop::new().map_err(ViewerError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(ViewerError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer =
        Renderer::new(window, config.clear_color).map_err(ViewerError::CreateRenderer)?;

    let mut camera = Camera2D::new(renderer.viewport());
    camera.center_on(Vec2::new(
        world.width() as f32 * 0.5,
        world.height() as f32 * 0.5,
    ));
    camera.clamp_to_world(world.width(), world.height());

    event_loop.set_control_flow(ControlFlow::Poll);

    info!(
        map = %map_path.display(),
        world_width_px = world.width(),
        world_height_px = world.height(),
        camera_speed_px_per_second = config.camera_speed_px_per_second,
        "viewer_started"
    );

    let mut actions = ActionStates::default();
    let mut cursor_px: Option<Vec2> = None;
    let mut last_frame_instant = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                            return;
                        }
                        camera.viewport = renderer.viewport();
                        camera.clamp_to_world(world.width(), world.height());
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        cursor_px = Some(Vec2::new(position.x as f32, position.y as f32));
                    }
                    WindowEvent::CursorLeft { .. } => {
                        cursor_px = None;
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        if let Some(cursor) = cursor_px {
                            log_tile_probe(&world, &camera, cursor);
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let Some(action) = InputAction::from_physical_key(event.physical_key)
                        else {
                            return;
                        };
                        let is_pressed = event.state == ElementState::Pressed;
                        actions.set(action, is_pressed);
                        if action == InputAction::Quit && is_pressed {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let frame_dt = clamp_frame_delta(
                            now.saturating_duration_since(last_frame_instant),
                            config.max_frame_delta,
                        );
                        last_frame_instant = now;

                        pan_camera(
                            &mut camera,
                            &actions,
                            config.camera_speed_px_per_second,
                            frame_dt,
                            (world.width(), world.height()),
                        );

                        match renderer.render_world(&world, &camera) {
                            Ok(stats) => trace!(
                                visited = stats.visited,
                                drawn = stats.drawn,
                                camera_x = camera.position.x,
                                camera_y = camera.position.y,
                                "frame_rendered"
                            ),
                            Err(error) => {
                                warn!(error = %error, "renderer_draw_failed");
                                window_target.exit();
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(ViewerError::EventLoopRun)
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    if max_frame_delta.is_zero() {
        return frame_dt;
    }
    frame_dt.min(max_frame_delta)
}

fn pan_camera(
    camera: &mut Camera2D,
    actions: &ActionStates,
    speed_px_per_second: f32,
    frame_dt: Duration,
    world_size_px: (u32, u32),
) {
    let (dx, dy) = actions.pan_direction();
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let distance = speed_px_per_second * frame_dt.as_secs_f32();
    camera.pan(dx * distance, dy * distance);
    camera.clamp_to_world(world_size_px.0, world_size_px.1);
}

fn probe_tile(
    world: &TileWorld<SheetPalette>,
    camera: &Camera2D,
    cursor_px: Vec2,
) -> Result<TileProbe, TileWorldError> {
    let position = camera.screen_to_world(cursor_px);
    let tile = world.tile_index_at(position)?;
    let collision = match world.collision_color_at(position) {
        Ok(color) => Some(color),
        Err(TileWorldError::NoCollisionPalette) => None,
        Err(error) => return Err(error),
    };
    Ok(TileProbe {
        position,
        tile,
        collision,
    })
}

fn log_tile_probe(world: &TileWorld<SheetPalette>, camera: &Camera2D, cursor_px: Vec2) {
    match probe_tile(world, camera, cursor_px) {
        Ok(probe) => info!(
            x = probe.position.x,
            y = probe.position.y,
            tile = probe.tile,
            collision = ?probe.collision.map(Color::to_array),
            "tile_probe"
        ),
        Err(TileWorldError::PositionOutOfBounds { x, y }) => {
            debug!(x, y, "tile_probe_outside_world");
        }
        Err(error) => warn!(error = %error, "tile_probe_failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld::{TileGrid, Viewport};

    fn solid_sheet(colors: &[[u8; 4]], tile_size: u32) -> SheetPalette {
        let sheet_width = colors.len() as u32 * tile_size;
        let mut rgba = Vec::new();
        for _ in 0..tile_size {
            for x in 0..sheet_width {
                rgba.extend_from_slice(&colors[(x / tile_size) as usize]);
            }
        }
        SheetPalette::from_rgba(sheet_width, tile_size, rgba, tile_size, tile_size)
            .expect("sheet")
    }

    fn sample_world() -> TileWorld<SheetPalette> {
        let grid = TileGrid::from_rows(vec![vec![0, 1, 0, 1], vec![1, 0, 1, 0]]).expect("grid");
        TileWorld::new(solid_sheet(&[[1, 1, 1, 255], [2, 2, 2, 255]], 16), grid).expect("world")
    }

    fn camera(width: u32, height: u32) -> Camera2D {
        Camera2D::new(Viewport { width, height })
    }

    #[test]
    fn frame_delta_is_clamped() {
        let max = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_secs(2), max),
            Duration::from_millis(250)
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max),
            Duration::from_millis(16)
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_secs(2), Duration::ZERO),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn pan_moves_by_speed_times_dt_and_stays_in_world() {
        let mut camera = camera(32, 16);
        let mut actions = ActionStates::default();
        actions.set(InputAction::PanRight, true);

        pan_camera(
            &mut camera,
            &actions,
            100.0,
            Duration::from_millis(100),
            (64, 32),
        );
        assert!((camera.position.x - 10.0).abs() < 0.001);
        assert_eq!(camera.position.y, 0.0);

        pan_camera(&mut camera, &actions, 100.0, Duration::from_secs(5), (64, 32));
        assert_eq!(camera.position.x, 32.0);
    }

    #[test]
    fn idle_input_does_not_move_camera() {
        let mut camera = camera(32, 16);
        camera.position = Vec2::new(3.0, 4.0);
        pan_camera(
            &mut camera,
            &ActionStates::default(),
            100.0,
            Duration::from_secs(1),
            (64, 32),
        );
        assert_eq!(camera.position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn probe_uses_camera_offset_and_reports_missing_collision_palette() {
        let world = sample_world();
        let mut camera = camera(32, 32);
        camera.position = Vec2::new(16.0, 0.0);

        let probe = probe_tile(&world, &camera, Vec2::new(2.0, 20.0)).expect("probe");
        assert_eq!(probe.position, Vec2::new(18.0, 20.0));
        assert_eq!(probe.tile, 0);
        assert_eq!(probe.collision, None);

        assert!(matches!(
            probe_tile(&world, &camera, Vec2::new(60.0, 0.0)),
            Err(TileWorldError::PositionOutOfBounds { .. })
        ));
    }

    #[test]
    fn probe_reads_collision_color_when_available() {
        let world = sample_world()
            .with_collision_palette(solid_sheet(&[[0, 0, 0, 255], [255, 0, 0, 255]], 16))
            .expect("collision");
        let probe = probe_tile(&world, &camera(64, 32), Vec2::new(20.0, 4.0)).expect("probe");
        assert_eq!(probe.tile, 1);
        assert_eq!(probe.collision, Some(Color::rgba(255, 0, 0, 255)));
    }
}
