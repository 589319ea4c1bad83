use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use hg_engine::{
    core::{timing::DeltaTime, Arena, FrameControl, Game, StackAllocator, VersionInfo},
    log::info,
    memory::ArenaHandle,
};
use nalgebra_glm::{self as glm, Mat4};

const CAMERA_FOV: f32 = std::f32::consts::FRAC_PI_4;
const INIT_ASPECT_RATIO: f32 = 16.0 / 9.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 100.0;

const SYMBOL_SPIN: f32 = 1.0;
const PLANET_SPIN: f32 = -1.0;
const SYMBOL_WOBBLE: f32 = 0.5;

const REPORT_EVERY: u64 = 120;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Camera {
    view: Mat4,
    proj: Mat4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Light {
    ambient: [f32; 3],
    position: [f32; 3],
    color: [f32; 3],
}

/// Everything that lives in the arena between frames, in push order.
#[derive(Debug, Clone, Copy)]
struct Scene {
    symbol: ArenaHandle,
    planet: ArenaHandle,
    camera: ArenaHandle,
    rot: ArenaHandle,
    light: ArenaHandle,
}

/// Two spinning entities lit by a single light, seen by a fixed camera.
#[derive(Default)]
pub struct SandboxGame {
    scene: Option<Scene>,
    frames: u64,
}

impl SandboxGame {
    fn scene(&self) -> Result<Scene> {
        self.scene.context("The sandbox scene was not started")
    }
}

impl Game for SandboxGame {
    fn version_info(&self) -> VersionInfo {
        VersionInfo {
            major: 0,
            minor: 0,
            patch: 1,
            name: "Hg_Sandbox",
        }
    }

    fn start(&mut self, arena: &mut Arena) -> Result<()> {
        let symbol = arena.push_value(&Mat4::identity())?;
        let planet = arena.push_value(&Mat4::identity())?;

        let camera = arena.push_value(&Camera {
            view: glm::translation(&glm::vec3(0.0, 0.0, -2.0)),
            proj: glm::perspective(INIT_ASPECT_RATIO, CAMERA_FOV, CAMERA_NEAR, CAMERA_FAR),
        })?;

        let rot = arena.push_value(&0.0f32)?;

        let light = arena.push_value(&Light {
            ambient: [0.1, 0.1, 0.1],
            position: [2.0, 0.0, -0.1],
            color: [1.0, 1.0, 1.0],
        })?;

        self.scene = Some(Scene {
            symbol,
            planet,
            camera,
            rot,
            light,
        });

        info!("Sandbox scene uses {} bytes of the arena", arena.used());
        Ok(())
    }

    fn frame(&mut self, arena: &mut Arena, delta: DeltaTime) -> Result<FrameControl> {
        let scene = self.scene()?;
        let dt = delta.as_secs_f64() as f32;

        // The symbol wobbles around z at a rate that follows a slow phase.
        let rot = (arena.read_value::<f32>(&scene.rot)? + SYMBOL_WOBBLE * dt)
            % std::f32::consts::TAU;
        arena.write_value(&scene.rot, &rot)?;

        let symbol = arena.read_value::<Mat4>(&scene.symbol)?;
        let symbol = glm::rotate_y(&glm::rotate_z(&symbol, rot.sin() * dt), SYMBOL_SPIN * dt);
        arena.write_value(&scene.symbol, &symbol)?;

        let planet = arena.read_value::<Mat4>(&scene.planet)?;
        arena.write_value(&scene.planet, &glm::rotate_y(&planet, PLANET_SPIN * dt))?;

        // Per-frame scratch: model-view-projection matrices for both entities.
        let camera = arena.read_value::<Camera>(&scene.camera)?;
        let view_proj = camera.proj * camera.view;
        let draw_size = std::mem::size_of::<[Mat4; 2]>();
        let mvps = [
            view_proj * arena.read_value::<Mat4>(&scene.symbol)?,
            view_proj * arena.read_value::<Mat4>(&scene.planet)?,
        ];
        let draw_list = arena.allocate_zeroed(draw_size)?;
        arena.write_value(&draw_list, &mvps)?;

        self.frames += 1;
        if self.frames % REPORT_EVERY == 0 {
            let [symbol_mvp, _] = arena.read_value::<[Mat4; 2]>(&draw_list)?;
            let light = arena.read_value::<Light>(&scene.light)?;
            info!(
                "Frame {}: symbol at {:?}, lit from {:?}",
                self.frames,
                [symbol_mvp[(0, 3)], symbol_mvp[(1, 3)], symbol_mvp[(2, 3)]],
                light.position
            );
        }

        arena.release(draw_list, draw_size)?;
        Ok(FrameControl::Continue)
    }

    fn end(&mut self, arena: &mut Arena) -> Result<()> {
        let scene = match self.scene.take() {
            Some(scene) => scene,
            None => return Ok(()),
        };

        arena.release(scene.light, std::mem::size_of::<Light>())?;
        arena.release(scene.rot, std::mem::size_of::<f32>())?;
        arena.release(scene.camera, std::mem::size_of::<Camera>())?;
        arena.release(scene.planet, std::mem::size_of::<Mat4>())?;
        arena.release(scene.symbol, std::mem::size_of::<Mat4>())?;
        Ok(())
    }
}
