//! Tilescape headless demo
//!
//! Drives a scene through its idle orbit, activation, a drag-and-throw and
//! every layout with a recording renderer, then prints where the tiles ended
//! up.
//!
//! Usage: `tilescape [settings.json] [items.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::thread;

    use glam::{Vec2, Vec3};
    use tilescape::consts::SIM_DT;
    use tilescape::content::{ContentEvent, parse_content_list};
    use tilescape::renderer::HeadlessRenderer;
    use tilescape::{ContentItem, InputEvent, LayoutParams, Scene, SceneEvent, SceneSettings};

    env_logger::init();
    log::info!("Tilescape (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => SceneSettings::load_or_default(path),
        None => SceneSettings::default(),
    };
    let items = match args.next().map(std::fs::read_to_string) {
        Some(Ok(json)) => match parse_content_list(&json) {
            Ok(items) => items,
            Err(e) => {
                log::error!("Invalid content list: {e}");
                std::process::exit(1);
            }
        },
        Some(Err(e)) => {
            log::error!("Failed to read content list: {e}");
            std::process::exit(1);
        }
        None => (0..12)
            .map(|i| {
                let mut item = ContentItem::new(format!("post-{i}"), format!("Post {i}"));
                item.thumbnail_ref = Some(format!("thumbs/post-{i}.jpg"));
                item
            })
            .collect(),
    };

    let mut scene = Scene::new(HeadlessRenderer::new(), settings);
    scene.set_forces_enabled(true);
    scene.load_items(items);

    // Host-side loader: pretend every asset loads on a worker thread
    let serve_content = |scene: &mut Scene<HeadlessRenderer>| {
        let requests = scene.take_content_requests();
        let sender = scene.content_sender();
        let worker = thread::spawn(move || {
            for request in &requests {
                let _ = sender.send(ContentEvent::loaded(request));
            }
        });
        if worker.join().is_err() {
            log::warn!("Content worker panicked");
        }
    };

    let run = |scene: &mut Scene<HeadlessRenderer>, seconds: f32| {
        let frames = (seconds / SIM_DT).ceil() as usize;
        for _ in 0..frames {
            scene.update(SIM_DT);
        }
    };

    serve_content(&mut scene);
    run(&mut scene, 1.0);

    scene.push_input(InputEvent::Click(Vec2::ZERO));
    run(&mut scene, 2.5);
    serve_content(&mut scene);

    // Grab the first tile, fling it right and let the spring pull it back
    if let Some(tile) = scene.state().tiles.first() {
        let id = tile.id.clone();
        let start = tile.visible.position;
        let view_projection = scene.state().camera.view_projection();
        let to_ndc = |p: Vec3| {
            let clip = view_projection * p.extend(1.0);
            Vec2::new(clip.x / clip.w, clip.y / clip.w)
        };
        scene.push_input(InputEvent::PointerDown(to_ndc(start)));
        scene.update(SIM_DT);
        for step in 1..=4 {
            scene.push_input(InputEvent::PointerMove(to_ndc(start + Vec3::X * step as f32 * 0.5)));
            scene.update(SIM_DT);
        }
        scene.push_input(InputEvent::PointerUp(to_ndc(start + Vec3::X * 2.0)));
        scene.update(SIM_DT);
        if let Some(tile) = scene.state().tile(&id) {
            log::info!("Threw {id} with velocity {:?}", tile.velocity);
        }
        run(&mut scene, 1.5);
    }

    for name in scene.available_layouts() {
        match scene.set_layout_mode(name, LayoutParams::new(), None) {
            Ok(request) => log::info!("{name}: {request:?}"),
            Err(e) => log::error!("{name}: {e}"),
        }
        scene.push_input(InputEvent::PointerMove(Vec2::new(0.1, 0.1)));
        run(&mut scene, 2.5);
    }

    for event in scene.drain_events() {
        match event {
            SceneEvent::TileActivated { id, item } => println!("activated {id} ({})", item.title),
            SceneEvent::TransitionCompleted { mode } => println!("settled in {mode}"),
            SceneEvent::ContentFailed { id, error } => println!("content failed for {id}: {error}"),
            SceneEvent::TransitionStarted { .. } => {}
        }
    }

    println!("\nFinal layout: {:?}", scene.mode());
    for tile in &scene.state().tiles {
        let p = tile.visible.position;
        println!(
            "  {:<10} {:>7.2} {:>7.2} {:>7.2}  {}",
            tile.id,
            p.x,
            p.y,
            p.z,
            tile.shape.as_str()
        );
    }

    scene.dispose();
}

/// Browser hosts drive `Scene` themselves; this only wires up logging
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Tilescape (web) ready");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
