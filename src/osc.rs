use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc::Sender;

use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::controls::ControlCommand;

/// Listens for OSC messages and forwards them to the main loop as commands.
pub struct OscReceiver {
    sock: UdpSocket,
    sender: Sender<ControlCommand>,
}

impl OscReceiver {
    pub fn new(listen_addr: SocketAddr, sender: Sender<ControlCommand>) -> Result<Self, String> {
        let sock = match UdpSocket::bind(listen_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        log::info!("Listening for OSC on {}", listen_addr);
        Ok(OscReceiver { sock, sender })
    }

    pub fn run(&self) {
        let mut buf = [0u8; rosc::decoder::MTU];

        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::trace!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => {
                            if !self.handle_packet(packet) {
                                break;
                            }
                        }
                        Err(error) => log::warn!("Malformed OSC packet from {}: {:?}", addr, error),
                    }
                }
                Err(e) => {
                    log::error!("Error receiving from socket: {}", e);
                    break;
                }
            }
        }
    }

    /// Returns false once the main loop stopped listening.
    fn handle_packet(&self, packet: OscPacket) -> bool {
        match packet {
            OscPacket::Message(msg) => match command_for(&msg) {
                Ok(command) => self.sender.send(command).is_ok(),
                Err(error) => {
                    log::debug!("{}", error);
                    true
                }
            },
            OscPacket::Bundle(bundle) => bundle
                .content
                .into_iter()
                .all(|packet| self.handle_packet(packet)),
        }
    }
}

/// Maps one OSC message onto the command it stands for.
pub fn command_for(msg: &OscMessage) -> Result<ControlCommand, String> {
    match msg.addr.as_str() {
        "/visualizer/bars" => Ok(ControlCommand::SelectMode("bars".to_string())),
        "/visualizer/wave" => Ok(ControlCommand::SelectMode("wave".to_string())),
        "/visualizer/circle" => Ok(ControlCommand::SelectMode("circle".to_string())),
        "/visualizer/particles" => Ok(ControlCommand::SelectMode("particles".to_string())),
        "/visualizer/mode" => string_argument(msg).map(ControlCommand::SelectMode),
        "/player/track" => string_argument(msg).map(ControlCommand::SelectTrack),
        "/player/play" => Ok(ControlCommand::Play),
        "/player/pause" => Ok(ControlCommand::Pause),
        "/player/toggle" => Ok(ControlCommand::TogglePlayback),
        _ => Err(format!(
            "Unhandled OSC address: {} {:?}",
            msg.addr, msg.args
        )),
    }
}

fn string_argument(msg: &OscMessage) -> Result<String, String> {
    match msg.args.first() {
        Some(OscType::String(value)) => Ok(value.clone()),
        Some(arg) => Err(format!(
            "{} Unexpected OSC parameter type: {:?}",
            msg.addr, arg
        )),
        None => Err(format!("{} Missing OSC parameter: string", msg.addr)),
    }
}
