//! Four-slot message tuple, filled one channel at a time.

use contracts::{GroupSource, StreamChannel, StreamMessage, SyncGroup};

#[derive(Debug, Default)]
pub(crate) struct MessageTuple {
    slots: [Option<StreamMessage>; 4],
}

impl MessageTuple {
    /// Store a message in its channel slot, returning the one it replaced
    pub fn insert(&mut self, message: StreamMessage) -> Option<StreamMessage> {
        let idx = message.channel().index();
        self.slots[idx].replace(message)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Channels holding a message
    pub fn occupied(&self) -> impl Iterator<Item = StreamChannel> + '_ {
        StreamChannel::ALL
            .into_iter()
            .filter(|channel| self.slots[channel.index()].is_some())
    }

    /// Assemble the group; `None` unless every slot holds the right kind
    pub fn into_group(self) -> Option<SyncGroup> {
        let [left_image, right_image, left_info, right_info] = self.slots;
        match (left_image?, right_image?, left_info?, right_info?) {
            (
                StreamMessage::LeftImage(left_image),
                StreamMessage::RightImage(right_image),
                StreamMessage::LeftInfo(left_info),
                StreamMessage::RightInfo(right_info),
            ) => Some(SyncGroup {
                left_image,
                right_image,
                left_info,
                right_info,
                source: GroupSource::FourStream,
            }),
            _ => None,
        }
    }
}
