use app::progress_file::ProgressFile;
use app::scene_mq::MacroquadScene;
use app::seed::{LaunchOptions, parse_args};
use app::status_line;
use core::{Floor, FloorParams, GenerationError};
use macroquad::prelude::{Conf, KeyCode, get_frame_time, is_key_down, is_key_pressed, next_frame};

const PLAYER_SPEED: f32 = 110.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Ironveil".to_string(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn floor_params(options: &LaunchOptions) -> FloorParams {
    let mut params = FloorParams::default();
    if let Some(target) = options.target_rooms {
        params.target_room_count = target;
    }
    if let Some(size) = options.room_size {
        params.room_size = size;
    }
    params
}

fn start_run(
    options: &LaunchOptions,
    seed: u64,
) -> Result<(Floor, MacroquadScene), GenerationError> {
    let params = floor_params(options);
    let mut scene = MacroquadScene::new(params.tile_len);
    let mut floor = Floor::new(params)?;
    floor.generate(&mut scene, Some(seed))?;
    Ok((floor, scene))
}

fn save_progress(floor: &Floor) {
    let Some(path) = ProgressFile::default_path() else {
        return;
    };
    let progress = ProgressFile::from_snapshot(&floor.snapshot());
    if let Err(err) = progress.write_atomic(&path) {
        log::warn!("could not write floor progress to {}: {err}", path.display());
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return;
        }
    };

    let (mut floor, mut scene) = match start_run(&options, options.resolve_seed()) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("floor generation failed: {err}");
            return;
        }
    };
    let mut cleared_count = floor.completion_status().0;

    loop {
        let dt = get_frame_time();

        // A fresh floor on demand; the old one is discarded wholesale.
        if is_key_pressed(KeyCode::R) {
            match start_run(&options, core::rng::entropy_seed()) {
                Ok(run) => {
                    (floor, scene) = run;
                    cleared_count = floor.completion_status().0;
                }
                Err(err) => log::warn!("regeneration failed: {err}"),
            }
        }

        let mut dx = 0.0;
        let mut dy = 0.0;
        if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
            dx -= 1.0;
        }
        if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
            dx += 1.0;
        }
        if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
            dy -= 1.0;
        }
        if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
            dy += 1.0;
        }
        scene.move_player(dx * PLAYER_SPEED * dt, dy * PLAYER_SPEED * dt);

        floor.update(&mut scene);
        scene.step_fades(dt);

        let (completed, total) = floor.completion_status();
        if completed != cleared_count {
            cleared_count = completed;
            save_progress(&floor);
        }

        scene.draw(&status_line(floor.seed(), completed, total));
        next_frame().await
    }
}
