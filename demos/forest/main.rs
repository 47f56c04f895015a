use campfire_ngin::{Settings, settings::FireSettings};

fn main() -> anyhow::Result<()> {
    let settings = Settings {
        outline_asset: Some("stump.glb".to_string()),
        fire: FireSettings {
            scale: 0.8,
            ..Default::default()
        },
        ..Default::default()
    };
    campfire_ngin::flow::run(settings)
}
