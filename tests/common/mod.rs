//! An in-process stand-in for Live plus the AbletonOSC script.
//!
//! It answers on loopback with the same reply conventions as the real
//! bridge: the reply address echoes the request address, the leading index
//! arguments are echoed back, and a handler failure produces a message on
//! `/live/error` and no reply.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use ableton_osc::{live, AbletonOSC, Config, OscMessage, OscType, Shape};
use rosc::{decoder, encoder, OscPacket};
use tokio::{net::UdpSocket, task::JoinHandle};

/// Names the fake browser can find.
const BROWSER: &[&str] = &["Wavetable", "Operator", "Drum Rack", "Simpler", "Reverb"];

#[derive(Debug, Clone)]
pub struct Received {
    pub at: Instant,
    pub address: String,
    pub args: Vec<OscType>,
}

#[derive(Default)]
struct State {
    tracks: Vec<Vec<String>>,
    num_scenes: usize,
    values: HashMap<(String, Vec<i32>), Vec<OscType>>,
    notes: HashMap<Vec<i32>, Vec<OscType>>,
    delays: HashMap<String, Duration>,
    drops: HashMap<String, usize>,
    log: Vec<Received>,
}

pub struct FakeLive {
    socket: Arc<UdpSocket>,
    state: Arc<Mutex<State>>,
    reply_to: Arc<Mutex<Option<SocketAddr>>>,
    task: JoinHandle<()>,
}

impl FakeLive {
    /// Starts a bridge with `tracks` empty tracks and four scenes.
    pub async fn start(tracks: usize) -> FakeLive {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let state = Arc::new(Mutex::new(State {
            tracks: vec![Vec::new(); tracks],
            num_scenes: 4,
            ..State::default()
        }));
        let reply_to = Arc::new(Mutex::new(None));
        let task = tokio::spawn(serve(socket.clone(), state.clone(), reply_to.clone()));
        FakeLive {
            socket,
            state,
            reply_to,
            task,
        }
    }

    /// A client wired to this bridge with a short timeout.
    pub async fn connect(&self) -> AbletonOSC {
        self.connect_with(Duration::from_millis(300)).await
    }

    pub async fn connect_with(&self, timeout: Duration) -> AbletonOSC {
        let config = Config {
            send_port: self.socket.local_addr().unwrap().port(),
            receive_port: 0,
            timeout,
            ..Config::default()
        };
        let client = AbletonOSC::connect(config).await.unwrap();
        *self.reply_to.lock().unwrap() = Some(client.local_addr().unwrap());
        client
    }

    /// Holds every reply on `address` back for `delay`.
    pub fn delay(&self, address: &str, delay: Duration) {
        self.state.lock().unwrap().delays.insert(address.to_string(), delay);
    }

    /// Swallows the next `count` replies on `address`.
    pub fn drop_replies(&self, address: &str, count: usize) {
        self.state.lock().unwrap().drops.insert(address.to_string(), count);
    }

    /// Sends `message` to the client as if the bridge had produced it.
    pub async fn push(&self, address: &str, args: Vec<OscType>) {
        let target = (*self.reply_to.lock().unwrap()).expect("no client connected");
        send(&self.socket, target, address, args).await;
    }

    /// Every message received so far, in arrival order.
    pub fn received(&self) -> Vec<Received> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn received_on(&self, address: &str) -> Vec<Received> {
        self.received().into_iter().filter(|r| r.address == address).collect()
    }

    pub fn devices(&self, track: usize) -> Vec<String> {
        self.state.lock().unwrap().tracks[track].clone()
    }
}

impl Drop for FakeLive {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: Arc<UdpSocket>, state: Arc<Mutex<State>>, reply_to: Arc<Mutex<Option<SocketAddr>>>) {
    let mut buf = [0u8; 65536];
    loop {
        let Ok((size, _)) = socket.recv_from(&mut buf).await else {
            continue;
        };
        let Ok((_, OscPacket::Message(message))) = decoder::decode_udp(&buf[..size]) else {
            continue;
        };
        let Some(target) = *reply_to.lock().unwrap() else {
            continue;
        };

        let (replies, delay) = {
            let mut state = state.lock().unwrap();
            state.log.push(Received {
                at: Instant::now(),
                address: message.addr.clone(),
                args: message.args.clone(),
            });
            let mut replies = handle(&mut state, &message);
            if let Some(left) = state.drops.get_mut(&message.addr) {
                if *left > 0 {
                    *left -= 1;
                    replies.retain(|reply| reply.addr != message.addr);
                }
            }
            (replies, state.delays.get(&message.addr).copied())
        };

        let socket = socket.clone();
        let respond = async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            for reply in replies {
                send(&socket, target, &reply.addr, reply.args).await;
            }
        };
        if delay.is_some() {
            tokio::spawn(respond);
        } else {
            respond.await;
        }
    }
}

async fn send(socket: &UdpSocket, target: SocketAddr, address: &str, args: Vec<OscType>) {
    let packet = OscPacket::Message(OscMessage {
        addr: address.to_string(),
        args,
    });
    let bytes = encoder::encode(&packet).unwrap();
    socket.send_to(&bytes, target).await.unwrap();
}

fn reply(address: &str, args: Vec<OscType>) -> Vec<OscMessage> {
    vec![OscMessage {
        addr: address.to_string(),
        args,
    }]
}

fn failure(reason: &str) -> Vec<OscMessage> {
    reply(
        "/live/error",
        vec![OscType::String(format!("Error handling OSC message: {reason}"))],
    )
}

fn int_at(args: &[OscType], i: usize) -> Option<i32> {
    match args.get(i) {
        Some(OscType::Int(v)) => Some(*v),
        _ => None,
    }
}

fn handle(state: &mut State, message: &OscMessage) -> Vec<OscMessage> {
    let address = message.addr.as_str();
    let args = &message.args;

    match address {
        "/live/test" => return reply(address, vec![OscType::String("ok".into())]),
        "/live/application/get/version" => return reply(address, vec![OscType::Int(12), OscType::Int(1)]),
        "/live/song/get/num_tracks" => return reply(address, vec![OscType::Int(state.tracks.len() as i32)]),
        "/live/song/get/num_scenes" => return reply(address, vec![OscType::Int(state.num_scenes as i32)]),
        "/live/song/create_midi_track" | "/live/song/create_audio_track" => {
            let at = int_at(args, 0).unwrap_or(-1);
            if at < 0 || at as usize >= state.tracks.len() {
                state.tracks.push(Vec::new());
            } else {
                state.tracks.insert(at as usize, Vec::new());
            }
            return Vec::new();
        }
        _ => {}
    }

    let Some(op) = live::catalog().find(|op| op.address == address).copied() else {
        return Vec::new();
    };
    let n = op.prefix_len();
    if args.len() < n {
        return failure("not enough arguments");
    }
    let prefix: Vec<i32> = match args[..n]
        .iter()
        .map(|a| int_at(std::slice::from_ref(a), 0))
        .collect::<Option<Vec<i32>>>()
    {
        Some(prefix) => prefix,
        None => return failure("index is not an int"),
    };

    if n > 0 {
        let track = prefix[0];
        let is_scene = matches!(op.level, ableton_osc::Level::Scene);
        let bound = if is_scene { state.num_scenes } else { state.tracks.len() };
        if track < 0 || track as usize >= bound {
            return failure("list index out of range");
        }
        if matches!(op.level, ableton_osc::Level::Device | ableton_osc::Level::Parameter)
            && prefix[1] as usize >= state.tracks[track as usize].len()
        {
            return failure("list index out of range");
        }
    }

    let echo = |payload: Vec<OscType>| {
        let mut out: Vec<OscType> = prefix.iter().copied().map(OscType::Int).collect();
        out.extend(payload);
        reply(address, out)
    };

    match address {
        "/live/track/insert_device" => {
            let name = match args.get(1) {
                Some(OscType::String(name)) => name.to_lowercase(),
                _ => return failure("device name missing"),
            };
            let found = BROWSER.iter().find(|candidate| candidate.to_lowercase().contains(&name));
            let devices = &mut state.tracks[prefix[0] as usize];
            let index = match found {
                Some(device) => {
                    devices.push(device.to_string());
                    devices.len() as i32 - 1
                }
                None => -1,
            };
            return echo(vec![OscType::Int(index)]);
        }
        "/live/track/get/num_devices" => {
            return echo(vec![OscType::Int(state.tracks[prefix[0] as usize].len() as i32)]);
        }
        "/live/track/get/devices/name" => {
            let names = state.tracks[prefix[0] as usize].iter().cloned().map(OscType::String).collect();
            return echo(names);
        }
        "/live/device/get/name" => {
            let name = state.tracks[prefix[0] as usize][prefix[1] as usize].clone();
            return echo(vec![OscType::String(name)]);
        }
        "/live/device/get/num_parameters" => return echo(vec![OscType::Int(3)]),
        "/live/device/get/parameter/name" => return echo(vec![OscType::String(format!("Macro {}", prefix[2] + 1))]),
        "/live/device/get/parameter/max" => return echo(vec![OscType::Float(1.0)]),
        "/live/clip/add/notes" => {
            state.notes.entry(prefix.clone()).or_default().extend(args[n..].iter().cloned());
            return Vec::new();
        }
        "/live/clip/get/notes" => return echo(state.notes.get(&prefix).cloned().unwrap_or_default()),
        "/live/clip/remove/notes" => {
            let window = (
                f32_at(args, n),
                int_at(args, n + 1).unwrap_or(0),
                f32_at(args, n + 2),
                int_at(args, n + 3).unwrap_or(128),
            );
            if let Some(notes) = state.notes.get_mut(&prefix) {
                let kept = notes
                    .chunks(5)
                    .filter(|note| {
                        let pitch = int_at(note, 0).unwrap_or(0);
                        let start = f32_at(note, 1);
                        let inside = start >= window.0
                            && start < window.0 + window.2
                            && pitch >= window.1
                            && pitch < window.1 + window.3;
                        !inside
                    })
                    .flatten()
                    .cloned()
                    .collect();
                *notes = kept;
            }
            return Vec::new();
        }
        _ => {}
    }

    // Generic properties: `set` stores, `get` reads back.
    let property = |verb: &str| address.split_once(&format!("/{verb}/")).map(|(obj, prop)| format!("{obj}/{prop}"));
    if let Some(key) = property("set") {
        state.values.insert((key, prefix.clone()), args[n..].to_vec());
        return Vec::new();
    }
    if let Some(key) = property("get") {
        let stored = state.values.get(&(key, prefix.clone())).cloned();
        return echo(stored.unwrap_or_else(|| default_value(address, op.returns)));
    }
    Vec::new()
}

fn f32_at(args: &[OscType], i: usize) -> f32 {
    match args.get(i) {
        Some(OscType::Float(v)) => *v,
        Some(OscType::Int(v)) => *v as f32,
        _ => 0.0,
    }
}

fn default_value(address: &str, shape: Shape) -> Vec<OscType> {
    match (address, shape) {
        ("/live/song/get/tempo", _) => vec![OscType::Float(120.0)],
        ("/live/track/get/volume", _) => vec![OscType::Float(0.85)],
        (_, Shape::Float) => vec![OscType::Float(0.0)],
        (_, Shape::Int) | (_, Shape::Bool) => vec![OscType::Int(0)],
        (_, Shape::Str) => vec![OscType::String(String::new())],
        (_, Shape::IntPair) => vec![OscType::Int(0), OscType::Int(0)],
        _ => Vec::new(),
    }
}
