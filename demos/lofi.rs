use ableton_osc::{
    live::clip::Note,
    theory::{self, ChordKind, ScaleKind},
    AbletonOSC, Config, Error,
};

const CLIP_LENGTH: f32 = 32.0;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let live = AbletonOSC::connect(Config::from_env()?).await?;
    if !live.application().test().await? {
        println!("AbletonOSC is not answering. Is Live running with the remote script enabled?");
        return Ok(());
    }
    let (major, minor) = live.application().get_version().await?;
    println!("Connected to Live {}.{}", major, minor);

    let song = live.song();
    song.stop_playing().await?;
    song.set_tempo(75.0).await?;

    // Keys, bass and melody on new MIDI tracks at the end of the set.
    let first = song.get_num_tracks().await?;
    let names = ["Keys", "Bass", "Melody"];
    for name in names {
        song.create_midi_track(None).await?;
        let index = song.get_num_tracks().await? - 1;
        live.track().set_name(index, name).await?;
    }
    let (keys, bass, melody) = (first, first + 1, first + 2);

    for (track, device) in [(keys, "Electric"), (bass, "Operator"), (melody, "Wavetable")] {
        match live.track().insert_device(track, device).await? {
            Some(index) => println!("Loaded {} as device {} on track {}", device, index, track),
            None => {
                // Not every edition ships every instrument.
                let fallback = live.track().insert_device(track, "Wavetable").await?;
                println!("{} not found, fallback device: {:?}", device, fallback);
            }
        }
    }
    live.track().set_volume(bass, 0.7).await?;

    for track in [keys, bass, melody] {
        live.clip_slot().create_clip(track, 0, Some(CLIP_LENGTH)).await?;
    }

    // i - VI - III - VII in D minor, two bars each.
    let progression = [
        ("D", ChordKind::Minor7, 0.0),
        ("Bb", ChordKind::Major7, 8.0),
        ("F", ChordKind::Major7, 16.0),
        ("C", ChordKind::Dominant7, 24.0),
    ];

    let mut chords = Vec::new();
    let mut roots = Vec::new();
    for (root, kind, start) in progression {
        for pitch in theory::spread(&theory::chord(root, kind, 3)?) {
            chords.push(Note::new(pitch, start, 7.5, 75));
        }
        let low = theory::note(root, 1)?;
        for beat in 0..8 {
            // Octave jump on the third beat of each bar.
            let pitch = if beat % 4 == 2 { low + 12 } else { low };
            roots.push(Note::new(pitch, start + beat as f32, 0.9, 90));
        }
    }
    live.clip().add_notes(keys, 0, &chords).await?;
    live.clip().add_notes(bass, 0, &roots).await?;

    let scale = theory::scale("D", ScaleKind::PentatonicMinor, 5)?;
    let steps = [0, 2, 3, 1, 4, 3, 2, 0];
    let tune: Vec<Note> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| Note::new(scale[*step], i as f32 * 4.0 + 0.5, 1.5, 70))
        .collect();
    live.clip().add_notes(melody, 0, &tune).await?;

    for (track, name) in [keys, bass, melody].into_iter().zip(names) {
        live.clip().set_name(track, 0, name).await?;
        let count = live.clip().get_notes(track, 0).await?.len();
        println!("{}: {} notes", name, count);
    }

    live.scene().fire(0).await?;
    println!("Playing scene 0. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    song.stop_playing().await?;

    Ok(())
}
