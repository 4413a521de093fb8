use serde::{Deserialize, Serialize};

use crate::room::RoomStatus;

/// Network message type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Client -> Store
    CreateRoom = 0x01,
    JoinRoom = 0x02,
    LeaveRoom = 0x03,
    PublishState = 0x04,
    DeleteRoom = 0x05,

    // Store -> Client
    RoomUpdate = 0x10,
    RoomDeleted = 0x11,
    CreateRoomResponse = 0x12,
    JoinRoomResponse = 0x13,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::CreateRoom),
            0x02 => Some(Self::JoinRoom),
            0x03 => Some(Self::LeaveRoom),
            0x04 => Some(Self::PublishState),
            0x05 => Some(Self::DeleteRoom),
            0x10 => Some(Self::RoomUpdate),
            0x11 => Some(Self::RoomDeleted),
            0x12 => Some(Self::CreateRoomResponse),
            0x13 => Some(Self::JoinRoomResponse),
            _ => None,
        }
    }
}

/// Create a room whose code the client generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomMsg {
    pub room_code: String,
    pub player_id: String,
    pub display_name: String,
    /// Initial game state as a MessagePack blob.
    pub state_data: Vec<u8>,
    pub protocol_version: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomMsg {
    pub room_code: String,
    pub player_id: String,
    pub display_name: String,
    pub protocol_version: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRoomMsg {
    pub room_code: String,
    pub player_id: String,
}

/// Replace the room's game state with a new whole-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishStateMsg {
    pub room_code: String,
    /// The full `GameState` snapshot as a MessagePack blob.
    pub state_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRoomMsg {
    pub room_code: String,
}

/// Pushed to every subscriber whenever the room document changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdateMsg {
    /// The full `RoomDoc` as a MessagePack blob.
    pub doc_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDeletedMsg {
    pub room_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomResponseMsg {
    pub success: bool,
    pub room_code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomResponseMsg {
    pub success: bool,
    pub room_status: Option<RoomStatus>,
    /// The joined `RoomDoc` as a MessagePack blob on success.
    pub doc_data: Option<Vec<u8>>,
    pub error: Option<String>,
}

/// Messages sent from a client to the room-document store.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    CreateRoom(CreateRoomMsg),
    JoinRoom(JoinRoomMsg),
    LeaveRoom(LeaveRoomMsg),
    PublishState(PublishStateMsg),
    DeleteRoom(DeleteRoomMsg),
}

impl ClientMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::CreateRoom(_) => MessageType::CreateRoom,
            Self::JoinRoom(_) => MessageType::JoinRoom,
            Self::LeaveRoom(_) => MessageType::LeaveRoom,
            Self::PublishState(_) => MessageType::PublishState,
            Self::DeleteRoom(_) => MessageType::DeleteRoom,
        }
    }
}

/// Messages pushed from the store to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMessage {
    RoomUpdate(RoomUpdateMsg),
    RoomDeleted(RoomDeletedMsg),
    CreateRoomResponse(CreateRoomResponseMsg),
    JoinRoomResponse(JoinRoomResponseMsg),
}

impl StoreMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::RoomUpdate(_) => MessageType::RoomUpdate,
            Self::RoomDeleted(_) => MessageType::RoomDeleted,
            Self::CreateRoomResponse(_) => MessageType::CreateRoomResponse,
            Self::JoinRoomResponse(_) => MessageType::JoinRoomResponse,
        }
    }
}
