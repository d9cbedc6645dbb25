mod common;

use ableton_osc::{tools::ToolSurface, Error};
use common::FakeLive;
use serde_json::json;

#[tokio::test]
async fn set_then_get_through_tools() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;
    let tools = ToolSurface::new(&live);

    assert_eq!(
        tools.invoke("song_set_tempo", &json!({ "tempo": 128 })).await.unwrap(),
        json!({ "status": "ok" })
    );
    assert_eq!(
        tools.invoke("song_get_tempo", &json!({})).await.unwrap(),
        json!({ "value": 128.0 })
    );
    assert_eq!(
        tools.invoke("track_get_mute", &json!({ "track_index": 1 })).await.unwrap(),
        json!({ "value": false })
    );
}

#[tokio::test]
async fn bad_arguments_never_reach_the_bridge() {
    let bridge = FakeLive::start(2).await;
    let live = bridge.connect().await;
    let tools = ToolSurface::new(&live);

    for (name, args) in [
        ("track_set_volume", json!({ "track_index": -1, "volume": 0.5 })),
        ("track_set_volume", json!({ "track_index": 0 })),
        ("track_set_volume", json!({ "track_index": 0, "volume": "loud" })),
        ("track_set_volume", json!({ "track_index": 0, "volume": 0.5, "pan": 1 })),
        ("song_set_tempo", json!([120])),
        ("track_insert_device", json!({ "track_index": 0, "device_name": "" })),
        ("track_insert_device", json!({ "track_index": 0, "device_name": "   " })),
    ] {
        let err = tools.invoke(name, &args).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{name} {args}: {err}");
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(bridge.received().is_empty());

    assert!(matches!(
        tools.invoke("song_get_mood", &json!({})).await,
        Err(Error::UnknownTool(name)) if name == "song_get_mood"
    ));
}

#[tokio::test]
async fn device_tools() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    let tools = ToolSurface::new(&live);

    let inserted = tools
        .invoke("track_insert_device", &json!({ "track_index": 0, "device_name": "Wavetable" }))
        .await
        .unwrap();
    assert_eq!(inserted, json!({ "value": 0 }));

    let missing = tools
        .invoke("track_insert_device", &json!({ "track_index": 0, "device_name": "Kazoo" }))
        .await
        .unwrap();
    assert_eq!(missing, json!({ "value": null }));

    let parameters = tools
        .invoke("device_get_parameters", &json!({ "track_index": 0, "device_index": 0 }))
        .await
        .unwrap();
    assert_eq!(parameters["parameters"].as_array().unwrap().len(), 3);
    assert_eq!(parameters["parameters"][0]["name"], "Macro 1");
}

#[tokio::test]
async fn notes_through_tools() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    let tools = ToolSurface::new(&live);

    let notes = json!([
        { "pitch": 50, "start_time": 0.0, "duration": 7.5, "velocity": 75 },
        { "pitch": 57, "start_time": 0.0, "duration": 7.5, "velocity": 75, "mute": true },
    ]);
    tools
        .invoke("clip_add_notes", &json!({ "track_index": 0, "clip_index": 0, "notes": notes }))
        .await
        .unwrap();

    let read = tools
        .invoke("clip_get_notes", &json!({ "track_index": 0, "clip_index": 0 }))
        .await
        .unwrap();
    assert_eq!(read["notes"][1]["pitch"], 57);
    assert_eq!(read["notes"][1]["mute"], true);
    assert_eq!(read["notes"][0]["mute"], false);
}

#[tokio::test]
async fn failures_become_error_objects() {
    let bridge = FakeLive::start(1).await;
    let live = bridge.connect().await;
    let tools = ToolSurface::new(&live);

    let result = tools.handle_tool_call("track_get_name", &json!({ "track_index": 9 })).await;
    assert_eq!(result["status"], "error");
    assert_eq!(result["kind"], "timeout");
    assert!(result["message"].as_str().unwrap().contains("list index out of range"));
}
