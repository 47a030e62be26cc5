use crate::prelude::*;
use std::str::FromStr;

/// Buffer playback markers.
///
/// The relay brackets each replayed buffer with a start and an end marker.
/// Both are judged against the newest line in the buffer, independently of
/// each other and of the lines in between.
impl<S: KeyValueStore, C: Clock> SuppressionEngine<S, C> {
    /// Playback of a channel buffer is starting.
    ///
    /// The start marker is halted if the client has already seen the newest
    /// line in the buffer, since nothing that follows will be delivered.
    pub fn on_chan_buffer_starting<B>(
        &self,
        client: &ClientHandle,
        channel: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        self.buffer_starting(client, channel, backlog)
    }

    /// Playback of a channel buffer is ending.
    ///
    /// The end marker advances the client to the newest buffered line, and
    /// is halted if that advance fails, i.e. the client was already there.
    /// Lines delivered through [`on_chan_buffer_play_line`] have already
    /// advanced the client that far, so after a playback that delivered the
    /// newest line the end marker is halted too. It only passes when the
    /// buffer holds lines that weren't played to this client.
    ///
    /// [`on_chan_buffer_play_line`]: Self::on_chan_buffer_play_line
    pub fn on_chan_buffer_ending<B>(
        &self,
        client: &ClientHandle,
        channel: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        self.buffer_ending(client, channel, backlog)
    }

    pub fn on_priv_buffer_starting<B>(
        &self,
        client: &ClientHandle,
        nick: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        self.buffer_starting(client, nick, backlog)
    }

    pub fn on_priv_buffer_ending<B>(
        &self,
        client: &ClientHandle,
        nick: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        self.buffer_ending(client, nick, backlog)
    }

    fn buffer_starting<B>(
        &self,
        client: &ClientHandle,
        target: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        let Some((id, target, last)) = self.marker_context(client, target, backlog) else {
            return Verdict::Continue;
        };

        // A watermark equal to the last line means that line was delivered
        let verdict = Verdict::halt_if(self.store().watermark(&id, &target).covers(last));
        tracing::debug!(client = %id, %target, %last, %verdict, "buffer start");
        verdict
    }

    fn buffer_ending<B>(
        &self,
        client: &ClientHandle,
        target: &str,
        backlog: &B,
    ) -> Verdict
    where
        B: Backlog + ?Sized,
    {
        let Some((id, target, last)) = self.marker_context(client, target, backlog) else {
            return Verdict::Continue;
        };

        let verdict = Verdict::halt_if(!self.store().advance(&id, &target, last));
        tracing::debug!(client = %id, %target, %last, %verdict, "buffer end");
        verdict
    }

    fn marker_context<B>(
        &self,
        client: &ClientHandle,
        target: &str,
        backlog: &B,
    ) -> Option<(ClientId, Target, Timestamp)>
    where
        B: Backlog + ?Sized,
    {
        let id = self.filtered_client(client)?;
        let last = backlog.last_timestamp()?;
        let target = Target::from_str(target).ok()?;
        Some((id, target, last))
    }
}
