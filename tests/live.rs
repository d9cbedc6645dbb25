mod common;

use std::time::{Duration, Instant};

use ableton_osc::{live::clip::Note, Error, OscType};
use common::FakeLive;

#[tokio::test]
async fn tempo_round_trip() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    assert_eq!(live.song().get_tempo().await.unwrap(), 120.0);
    live.song().set_tempo(95.5).await.unwrap();
    assert_eq!(live.song().get_tempo().await.unwrap(), 95.5);
}

#[tokio::test]
async fn invalid_tempo_is_rejected_before_sending() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    for bpm in [10.0, 1000.0, f32::NAN] {
        let err = live.song().set_tempo(bpm).await.unwrap_err();
        assert!(matches!(err, Error::Validation { ref name, .. } if name == "tempo"), "{err}");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(bridge.received_on("/live/song/set/tempo").is_empty());
}

#[tokio::test]
async fn volume_is_in_unit_range() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    let volume = live.track().get_volume(0).await.unwrap();
    assert!((0.0..=1.0).contains(&volume));

    live.track().set_volume(1, 0.4).await.unwrap();
    assert_eq!(live.track().get_volume(1).await.unwrap(), 0.4);
    assert!(live.track().set_volume(0, 1.5).await.is_err());
}

#[tokio::test]
async fn different_tracks_do_not_wait_for_each_other() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect_with(Duration::from_secs(2)).await;
    bridge.delay("/live/track/get/volume", Duration::from_millis(200));

    let started = Instant::now();
    let (a, b) = tokio::join!(live.track().get_volume(0), live.track().get_volume(1));
    a.unwrap();
    b.unwrap();
    assert!(started.elapsed() < Duration::from_millis(380), "{:?}", started.elapsed());
}

#[tokio::test]
async fn same_key_calls_are_serialized() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect_with(Duration::from_secs(2)).await;
    bridge.delay("/live/track/get/volume", Duration::from_millis(150));

    let (a, b) = tokio::join!(live.track().get_volume(0), live.track().get_volume(0));
    a.unwrap();
    b.unwrap();

    let requests = bridge.received_on("/live/track/get/volume");
    assert_eq!(requests.len(), 2);
    // The second request only goes out once the first reply is in.
    let gap = requests[1].at.duration_since(requests[0].at);
    assert!(gap >= Duration::from_millis(140), "{gap:?}");
}

#[tokio::test]
async fn concurrent_sets_on_one_track_keep_call_order() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    let (a, b) = tokio::join!(live.track().set_volume(0, 0.2), live.track().set_volume(0, 0.6));
    a.unwrap();
    b.unwrap();
    assert_eq!(live.track().get_volume(0).await.unwrap(), 0.6);

    let sent: Vec<_> = bridge
        .received_on("/live/track/set/volume")
        .into_iter()
        .map(|request| request.args)
        .collect();
    assert_eq!(
        sent,
        vec![
            vec![OscType::Int(0), OscType::Float(0.2)],
            vec![OscType::Int(0), OscType::Float(0.6)],
        ]
    );
}

#[tokio::test]
async fn stale_reply_goes_to_nobody() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;
    live.track().set_volume(1, 0.4).await.unwrap();
    bridge.delay("/live/track/get/volume", Duration::from_millis(100));

    let (volume, ()) = tokio::join!(live.track().get_volume(1), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        bridge
            .push("/live/track/get/volume", vec![OscType::Int(0), OscType::Float(0.2)])
            .await;
    });
    assert_eq!(volume.unwrap(), 0.4);

    let unmatched = live.drain_unmatched();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].args, vec![OscType::Int(0), OscType::Float(0.2)]);
    assert_eq!(live.unmatched_total(), 1);
}

#[tokio::test]
async fn late_reply_after_timeout_is_discarded() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    bridge.delay("/live/song/get/num_tracks", Duration::from_millis(400));

    let err = live.song().get_num_tracks().await.unwrap_err();
    assert!(err.is_timeout());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(live.drain_unmatched().len(), 1);
}

#[tokio::test]
async fn out_of_range_indices() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    let err = live.track().get_name(u32::MAX).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }), "{err}");

    match live.track().get_name(42).await {
        Err(Error::Timeout { prefix, bridge_error, .. }) => {
            assert_eq!(prefix, vec![42]);
            assert!(bridge_error.unwrap().contains("list index out of range"));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn inserted_device_is_addressable() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    let first = live.track().insert_device(0, "Wavetable").await.unwrap().unwrap();
    let second = live.track().insert_device(0, "reverb").await.unwrap().unwrap();
    assert!(second > first);
    assert_eq!(live.device().get_name(0, second).await.unwrap(), "Reverb");
    assert_eq!(live.track().get_num_devices(0).await.unwrap(), 2);
    assert_eq!(
        live.track().get_device_names(0).await.unwrap(),
        vec!["Wavetable".to_string(), "Reverb".to_string()]
    );

    assert_eq!(live.track().insert_device(0, "Theremin").await.unwrap(), None);
    assert_eq!(bridge.devices(0).len(), 2);

    let err = live.track().insert_device(0, " ").await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref name, .. } if name == "device_name"), "{err}");
    assert_eq!(bridge.received_on("/live/track/insert_device").len(), 3);
}

#[tokio::test]
async fn device_parameters_are_collected() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    let device = live.track().insert_device(0, "Operator").await.unwrap().unwrap();

    let parameters = live.device().get_parameters(0, device).await.unwrap();
    assert_eq!(parameters.len(), 3);
    assert_eq!(parameters[2].index, 2);
    assert_eq!(parameters[2].name, "Macro 3");
    assert_eq!(parameters[2].max, 1.0);

    assert!(live.device().set_parameter_checked(0, device, 1, 2.0).await.is_err());
    live.device().set_parameter_checked(0, device, 1, 0.5).await.unwrap();
    assert_eq!(live.device().get_parameter_value(0, device, 1).await.unwrap(), 0.5);
}

#[tokio::test]
async fn notes_round_trip() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    live.clip_slot().create_clip(0, 0, None).await.unwrap();

    let notes = vec![
        Note::new(60, 0.0, 1.0, 100),
        Note::new(64, 1.0, 1.0, 90),
        Note::new(67, 2.0, 0.5, 80),
    ];
    live.clip().add_notes(0, 0, &notes).await.unwrap();
    assert_eq!(live.clip().get_notes(0, 0).await.unwrap(), notes);

    live.clip().remove_notes(0, 0, 0.0, 1.5, 60, 64).await.unwrap();
    assert_eq!(live.clip().get_notes(0, 0).await.unwrap(), vec![notes[2]]);

    let sent = bridge.received_on("/live/clip/remove/notes");
    assert_eq!(
        sent[0].args,
        vec![
            OscType::Int(0),
            OscType::Int(0),
            OscType::Float(0.0),
            OscType::Int(60),
            OscType::Float(1.5),
            OscType::Int(5),
        ]
    );

    let bad = [Note::new(60, 0.0, -1.0, 100)];
    assert!(live.clip().add_notes(0, 0, &bad).await.is_err());
}

#[tokio::test]
async fn new_tracks_are_appended() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    live.song().create_midi_track(None).await.unwrap();
    assert_eq!(live.song().get_num_tracks().await.unwrap(), 3);
    assert_eq!(bridge.received_on("/live/song/create_midi_track")[0].args, vec![OscType::Int(-1)]);
}

#[tokio::test]
async fn booleans_travel_as_ints() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    live.track().set_mute(0, true).await.unwrap();
    assert!(live.track().get_mute(0).await.unwrap());
    assert_eq!(
        bridge.received_on("/live/track/set/mute")[0].args,
        vec![OscType::Int(0), OscType::Int(1)]
    );
}

#[tokio::test]
async fn view_selection_pairs() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    live.view().set_selected_clip(1, 3).await.unwrap();
    assert_eq!(live.view().get_selected_clip().await.unwrap(), (1, 3));
    assert_eq!(live.application().get_version().await.unwrap(), (12, 1));
}

#[tokio::test]
async fn tempo_updates_reach_listeners() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    let mut updates = live.song().listen_tempo().await.unwrap();
    bridge.push("/live/song/get/tempo", vec![OscType::Float(128.0)]).await;
    let update = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.args, vec![OscType::Float(128.0)]);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bridge.received_on("/live/song/start_listen/tempo").len(), 1);
}

#[tokio::test]
async fn stopped_volume_listener_receives_nothing_more() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;

    let mut updates = live.track().listen_volume(1).await.unwrap();
    // Query replies answer the query, not the listener.
    assert_eq!(live.track().get_volume(1).await.unwrap(), 0.85);
    bridge
        .push("/live/track/get/volume", vec![OscType::Int(0), OscType::Float(0.1)])
        .await;
    bridge
        .push("/live/track/get/volume", vec![OscType::Int(1), OscType::Float(0.5)])
        .await;
    let update = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.args, vec![OscType::Int(1), OscType::Float(0.5)]);

    live.track().stop_listen_volume(1).await.unwrap();
    live.track().get_volume(1).await.unwrap();
    bridge
        .push("/live/track/get/volume", vec![OscType::Int(1), OscType::Float(0.7)])
        .await;
    let ended = tokio::time::timeout(Duration::from_secs(1), updates.recv()).await.unwrap();
    assert!(ended.is_none(), "{ended:?}");
    assert_eq!(bridge.received_on("/live/track/stop_listen/volume")[0].args, vec![OscType::Int(1)]);
}

#[tokio::test]
async fn stopped_tempo_listener_ignores_later_queries() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;

    let mut updates = live.song().listen_tempo().await.unwrap();
    live.song().stop_listen_tempo().await.unwrap();
    assert_eq!(live.song().get_tempo().await.unwrap(), 120.0);
    assert!(updates.recv().await.is_none());
}

#[tokio::test]
async fn liveness_check() {
    let bridge = FakeLive::start(0).await;
    let live = bridge.connect().await;

    assert!(live.application().test().await.unwrap());
    bridge.drop_replies("/live/test", 1);
    assert!(!live.application().test().await.unwrap());
}

#[tokio::test]
async fn shut_down_client_refuses_calls() {
    let bridge = FakeLive::start(1).await;
    let mut live = bridge.connect().await;

    live.shutdown();
    live.join().await.unwrap();
    assert!(matches!(live.song().get_tempo().await, Err(Error::Closed)));
}
