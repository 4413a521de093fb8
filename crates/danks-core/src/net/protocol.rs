use serde::{Deserialize, Serialize};

use super::messages::{
    ClientMessage, CreateRoomMsg, CreateRoomResponseMsg, DeleteRoomMsg, JoinRoomMsg,
    JoinRoomResponseMsg, LeaveRoomMsg, MessageType, PublishStateMsg, RoomDeletedMsg,
    RoomUpdateMsg, StoreMessage,
};

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Maximum message payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a serializable payload with a 1-byte type prefix.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes =
        rmp_serde::to_vec(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Encode a `ClientMessage` to wire format.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        ClientMessage::CreateRoom(m) => encode_message(MessageType::CreateRoom, m),
        ClientMessage::JoinRoom(m) => encode_message(MessageType::JoinRoom, m),
        ClientMessage::LeaveRoom(m) => encode_message(MessageType::LeaveRoom, m),
        ClientMessage::PublishState(m) => encode_message(MessageType::PublishState, m),
        ClientMessage::DeleteRoom(m) => encode_message(MessageType::DeleteRoom, m),
    }
}

/// Encode a `StoreMessage` to wire format.
pub fn encode_store_message(msg: &StoreMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        StoreMessage::RoomUpdate(m) => encode_message(MessageType::RoomUpdate, m),
        StoreMessage::RoomDeleted(m) => encode_message(MessageType::RoomDeleted, m),
        StoreMessage::CreateRoomResponse(m) => {
            encode_message(MessageType::CreateRoomResponse, m)
        },
        StoreMessage::JoinRoomResponse(m) => encode_message(MessageType::JoinRoomResponse, m),
    }
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    MessageType::from_byte(data[0]).ok_or(ProtocolError::UnknownMessageType(data[0]))
}

/// Decode a MessagePack payload (bytes after the type prefix).
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Decode raw wire data into a `ClientMessage`.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    match msg_type {
        MessageType::CreateRoom => Ok(ClientMessage::CreateRoom(
            decode_payload::<CreateRoomMsg>(data)?,
        )),
        MessageType::JoinRoom => Ok(ClientMessage::JoinRoom(decode_payload::<JoinRoomMsg>(
            data,
        )?)),
        MessageType::LeaveRoom => Ok(ClientMessage::LeaveRoom(decode_payload::<LeaveRoomMsg>(
            data,
        )?)),
        MessageType::PublishState => Ok(ClientMessage::PublishState(decode_payload::<
            PublishStateMsg,
        >(data)?)),
        MessageType::DeleteRoom => Ok(ClientMessage::DeleteRoom(
            decode_payload::<DeleteRoomMsg>(data)?,
        )),
        _ => Err(ProtocolError::UnknownMessageType(data[0])),
    }
}

/// Decode raw wire data into a `StoreMessage`.
pub fn decode_store_message(data: &[u8]) -> Result<StoreMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    match msg_type {
        MessageType::RoomUpdate => Ok(StoreMessage::RoomUpdate(
            decode_payload::<RoomUpdateMsg>(data)?,
        )),
        MessageType::RoomDeleted => Ok(StoreMessage::RoomDeleted(decode_payload::<
            RoomDeletedMsg,
        >(data)?)),
        MessageType::CreateRoomResponse => Ok(StoreMessage::CreateRoomResponse(
            decode_payload::<CreateRoomResponseMsg>(data)?,
        )),
        MessageType::JoinRoomResponse => Ok(StoreMessage::JoinRoomResponse(decode_payload::<
            JoinRoomResponseMsg,
        >(data)?)),
        _ => Err(ProtocolError::UnknownMessageType(data[0])),
    }
}
