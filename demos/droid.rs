use std::path::PathBuf;
use std::time::Instant;

use droid_tts::{
    engines::droid::{DroidBankParams, DroidEngine, DroidInferenceParamsBuilder},
    SynthesisEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut engine = DroidEngine::new();
    let bank_path = PathBuf::from("sounds");

    let load_start = Instant::now();
    engine.load_bank_with_params(&bank_path, DroidBankParams::default())?;
    println!("Sound bank opened in {:.2?}", load_start.elapsed());

    let text = "Salut ! Je suis BD-1. Tu veux explorer avec moi ? Oui, super, merci !";

    let params = DroidInferenceParamsBuilder::default().seed(7).build()?;

    let synth_start = Instant::now();
    let utterance = engine.synthesize_detailed(text, &params)?;
    let synth_dur = synth_start.elapsed();

    println!("{}", utterance.alignment_table());
    println!(
        "Assembled {:.2}s of audio in {:.2?}",
        utterance.total_duration_secs, synth_dur
    );

    engine.synthesize_to_file(text, &PathBuf::from("output.wav"), Some(params))?;
    println!("Saved to output.wav");

    engine.unload_bank();
    Ok(())
}
