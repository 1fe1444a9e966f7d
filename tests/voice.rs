//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::time::Duration;

use parley::voice::{
    ListenStep, MIN_ENERGY_THRESHOLD, PhraseDetector, PhraseListener, PhraseState,
    RECORDING_GRACE, SAMPLE_RATE, calibrated_threshold, samples_to_wav,
};

const POLL: Duration = Duration::from_millis(100);

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

/// Detector with a threshold calibrated against quiet room noise
fn quiet_room_detector(phrase_limit_secs: u64) -> PhraseDetector {
    let ambient = generate_sine_samples(60.0, 1.0, 0.005);
    PhraseDetector::new(
        calibrated_threshold(&ambient),
        Duration::from_secs(phrase_limit_secs),
    )
}

#[test]
fn test_quiet_room_uses_floor_threshold() {
    let ambient = generate_sine_samples(60.0, 1.0, 0.005);
    let threshold = calibrated_threshold(&ambient);
    assert!((threshold - MIN_ENERGY_THRESHOLD).abs() < f32::EPSILON);
}

#[test]
fn test_noisy_room_raises_threshold() {
    let ambient = generate_sine_samples(120.0, 1.0, 0.2);
    let threshold = calibrated_threshold(&ambient);

    // Speech at the noise level no longer counts
    let mut detector = PhraseDetector::new(threshold, Duration::from_secs(5));
    let noise = generate_sine_samples(120.0, 0.5, 0.2);
    assert_eq!(detector.process(&noise), PhraseState::Waiting);

    // Louder speech does
    let speech = generate_sine_samples(440.0, 0.5, 0.6);
    assert_eq!(detector.process(&speech), PhraseState::Recording);
}

#[test]
fn test_silence_keeps_waiting() {
    let mut detector = quiet_room_detector(30);

    for _ in 0..20 {
        assert_eq!(detector.process(&generate_silence(0.1)), PhraseState::Waiting);
    }
    assert!(detector.phrase().is_empty());
}

#[test]
fn test_phrase_ends_on_pause() {
    let mut detector = quiet_room_detector(30);

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert_eq!(detector.process(&speech), PhraseState::Recording);

    let more_speech = generate_sine_samples(440.0, 0.3, 0.3);
    assert_eq!(detector.process(&more_speech), PhraseState::Recording);

    // A short breath does not end the phrase
    assert_eq!(
        detector.process(&generate_silence(0.3)),
        PhraseState::Recording
    );

    assert_eq!(
        detector.process(&generate_silence(0.6)),
        PhraseState::Complete
    );

    let phrase = detector.take_phrase();
    assert_eq!(
        phrase.len(),
        speech.len() + more_speech.len() + generate_silence(0.3).len() + generate_silence(0.6).len()
    );
    assert_eq!(detector.state(), PhraseState::Waiting);
}

#[test]
fn test_phrase_time_limit_cuts_recording() {
    let mut detector = quiet_room_detector(1);

    let mut state = PhraseState::Waiting;
    for _ in 0..15 {
        state = detector.process(&generate_sine_samples(440.0, 0.1, 0.3));
        if state == PhraseState::Complete {
            break;
        }
    }

    assert_eq!(state, PhraseState::Complete);
    assert_eq!(detector.phrase().len(), SAMPLE_RATE as usize);
}

#[test]
fn test_complete_state_is_sticky() {
    let mut detector = quiet_room_detector(1);
    detector.process(&generate_sine_samples(440.0, 1.5, 0.3));
    assert_eq!(detector.state(), PhraseState::Complete);

    let before = detector.phrase().len();
    detector.process(&generate_sine_samples(440.0, 0.5, 0.3));
    assert_eq!(detector.phrase().len(), before);
}

#[test]
fn test_empty_chunk_is_ignored() {
    let mut detector = quiet_room_detector(5);
    detector.process(&generate_sine_samples(440.0, 0.2, 0.3));
    assert_eq!(detector.process(&[]), PhraseState::Recording);
}

#[test]
fn test_listener_times_out_on_silence() {
    let mut listener =
        PhraseListener::new(MIN_ENERGY_THRESHOLD, Duration::from_secs(1), Duration::from_secs(5));

    let mut elapsed = Duration::ZERO;
    let step = loop {
        elapsed += POLL;
        match listener.poll(&generate_silence(0.1), elapsed) {
            ListenStep::Continue => assert!(elapsed < Duration::from_secs(1)),
            step => break step,
        }
    };

    assert_eq!(step, ListenStep::TimedOut);
    assert_eq!(elapsed, Duration::from_secs(1));
}

#[test]
fn test_listener_times_out_when_stream_is_silent() {
    let mut listener =
        PhraseListener::new(MIN_ENERGY_THRESHOLD, Duration::from_secs(1), Duration::from_secs(5));

    assert_eq!(listener.poll(&[], Duration::from_millis(500)), ListenStep::Continue);
    assert_eq!(listener.poll(&[], Duration::from_secs(1)), ListenStep::TimedOut);
}

#[test]
fn test_listener_returns_phrase_after_pause() {
    let mut listener =
        PhraseListener::new(MIN_ENERGY_THRESHOLD, Duration::from_secs(1), Duration::from_secs(5));

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    let pause = generate_silence(0.9);

    assert_eq!(listener.poll(&speech, POLL), ListenStep::Continue);
    match listener.poll(&pause, POLL * 2) {
        ListenStep::Phrase(samples) => assert_eq!(samples.len(), speech.len() + pause.len()),
        step => panic!("expected a phrase, got {step:?}"),
    }
}

#[test]
fn test_speech_past_timeout_keeps_recording() {
    let mut listener =
        PhraseListener::new(MIN_ENERGY_THRESHOLD, Duration::from_secs(1), Duration::from_secs(5));

    assert_eq!(
        listener.poll(&generate_sine_samples(440.0, 0.1, 0.3), Duration::from_millis(900)),
        ListenStep::Continue
    );
    assert_eq!(
        listener.poll(&generate_sine_samples(440.0, 0.1, 0.3), Duration::from_secs(2)),
        ListenStep::Continue
    );
}

#[test]
fn test_stalled_recording_is_cut_off() {
    let phrase_limit = Duration::from_secs(2);
    let mut listener = PhraseListener::new(MIN_ENERGY_THRESHOLD, Duration::from_secs(1), phrase_limit);

    let speech = generate_sine_samples(440.0, 0.4, 0.3);
    assert_eq!(listener.poll(&speech, POLL), ListenStep::Continue);

    // The device stops delivering audio mid-phrase
    let deadline = POLL + phrase_limit + RECORDING_GRACE;
    let mut elapsed = POLL;
    let step = loop {
        elapsed += POLL;
        match listener.poll(&[], elapsed) {
            ListenStep::Continue => assert!(elapsed < deadline),
            step => break step,
        }
    };

    assert_eq!(step, ListenStep::Phrase(speech));
    assert_eq!(elapsed, deadline);
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_wav_is_mono_16khz() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let cursor = Cursor::new(wav_data);
    let reader = hound::WavReader::new(cursor).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, original_samples.len());
}
