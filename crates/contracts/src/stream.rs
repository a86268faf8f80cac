//! Input streams and correlated groups
//!
//! The front end accepts either four independent channels, correlated by the
//! synchronizer, or one packed stereo message. Both become a [`SyncGroup`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CameraInfo, FrameId, Header, RawImageMessage, Timestamp};

/// One of the four independent input channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamChannel {
    LeftImage,
    RightImage,
    LeftInfo,
    RightInfo,
}

impl StreamChannel {
    pub const ALL: [StreamChannel; 4] = [
        StreamChannel::LeftImage,
        StreamChannel::RightImage,
        StreamChannel::LeftInfo,
        StreamChannel::RightInfo,
    ];

    /// Dense index for per-channel arrays
    pub const fn index(self) -> usize {
        match self {
            StreamChannel::LeftImage => 0,
            StreamChannel::RightImage => 1,
            StreamChannel::LeftInfo => 2,
            StreamChannel::RightInfo => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StreamChannel::LeftImage => "left_image",
            StreamChannel::RightImage => "right_image",
            StreamChannel::LeftInfo => "left_info",
            StreamChannel::RightInfo => "right_info",
        }
    }
}

impl fmt::Display for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message arriving on one of the four channels
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    LeftImage(RawImageMessage),
    RightImage(RawImageMessage),
    LeftInfo(CameraInfo),
    RightInfo(CameraInfo),
}

impl StreamMessage {
    pub fn channel(&self) -> StreamChannel {
        match self {
            StreamMessage::LeftImage(_) => StreamChannel::LeftImage,
            StreamMessage::RightImage(_) => StreamChannel::RightImage,
            StreamMessage::LeftInfo(_) => StreamChannel::LeftInfo,
            StreamMessage::RightInfo(_) => StreamChannel::RightInfo,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            StreamMessage::LeftImage(img) | StreamMessage::RightImage(img) => &img.header,
            StreamMessage::LeftInfo(info) | StreamMessage::RightInfo(info) => &info.header,
        }
    }

    #[inline]
    pub fn stamp(&self) -> Timestamp {
        self.header().stamp
    }
}

/// Both images and both calibration records in one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedStereoMessage {
    pub header: Header,
    pub left_image: RawImageMessage,
    pub right_image: RawImageMessage,
    pub left_info: CameraInfo,
    pub right_info: CameraInfo,
}

/// Event delivered by the transport collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Message on one of the four independent channels
    Stream(StreamMessage),
    /// Packed stereo message
    Packed(Box<PackedStereoMessage>),
}

impl From<StreamMessage> for InputEvent {
    fn from(msg: StreamMessage) -> Self {
        InputEvent::Stream(msg)
    }
}

impl From<PackedStereoMessage> for InputEvent {
    fn from(msg: PackedStereoMessage) -> Self {
        InputEvent::Packed(Box::new(msg))
    }
}

/// Where a group came from
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSource {
    /// Correlated from the four independent channels
    FourStream,
    /// Unpacked from one message carrying its own header
    Packed { header: Header },
}

/// Correlated messages describing one stereo event
#[derive(Debug, Clone, PartialEq)]
pub struct SyncGroup {
    pub left_image: RawImageMessage,
    pub right_image: RawImageMessage,
    pub left_info: CameraInfo,
    pub right_info: CameraInfo,
    pub source: GroupSource,
}

impl SyncGroup {
    /// Event stamp: the later of the two image stamps
    pub fn resolved_stamp(&self) -> Timestamp {
        self.left_image
            .header
            .stamp
            .max(self.right_image.header.stamp)
    }

    /// Frame the emitted data is reported in: the left image frame for
    /// correlated groups, the packed message's own frame otherwise
    pub fn sensor_frame_id(&self) -> &FrameId {
        match &self.source {
            GroupSource::FourStream => &self.left_image.header.frame_id,
            GroupSource::Packed { header } => &header.frame_id,
        }
    }

    /// Skew between the two image stamps in nanoseconds
    pub fn image_skew_nanos(&self) -> u64 {
        self.left_image
            .header
            .stamp
            .abs_diff(self.right_image.header.stamp)
    }
}

impl From<PackedStereoMessage> for SyncGroup {
    fn from(msg: PackedStereoMessage) -> Self {
        Self {
            left_image: msg.left_image,
            right_image: msg.right_image,
            left_info: msg.left_info,
            right_info: msg.right_info,
            source: GroupSource::Packed { header: msg.header },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraIntrinsics, ImageEncoding};

    fn image(frame: &str, nanos: u64) -> RawImageMessage {
        RawImageMessage::packed(
            Header::new(Timestamp::from_nanos(nanos), frame),
            ImageEncoding::Mono8,
            2,
            2,
            vec![0u8; 4],
        )
    }

    fn info(frame: &str, nanos: u64) -> CameraInfo {
        CameraInfo::new(
            Header::new(Timestamp::from_nanos(nanos), frame),
            CameraIntrinsics::default(),
        )
    }

    #[test]
    fn test_resolved_stamp_takes_later_image() {
        let group = SyncGroup {
            left_image: image("left", 100),
            right_image: image("right", 130),
            left_info: info("left", 100),
            right_info: info("right", 130),
            source: GroupSource::FourStream,
        };
        assert_eq!(group.resolved_stamp(), Timestamp::from_nanos(130));
        assert_eq!(group.image_skew_nanos(), 30);
        assert_eq!(group.sensor_frame_id(), "left");
    }

    #[test]
    fn test_packed_group_reports_packed_frame() {
        let msg = PackedStereoMessage {
            header: Header::new(Timestamp::from_nanos(90), "stereo_rig"),
            left_image: image("left", 100),
            right_image: image("right", 100),
            left_info: info("left", 100),
            right_info: info("right", 100),
        };
        let group = SyncGroup::from(msg);
        assert_eq!(group.sensor_frame_id(), "stereo_rig");
        assert_eq!(group.resolved_stamp(), Timestamp::from_nanos(100));
    }

    #[test]
    fn test_channel_indices_are_dense() {
        for (i, ch) in StreamChannel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
    }
}
