// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text console commands.
//!
//! Two commands exist: `hmNN` prints the overview of channel NN (two
//! digits, 1-based), `hm serials` lists the serials of all active
//! channels. Anything else returns an error line. The overview includes a
//! live `getDeviceDescription` fetch so the hub's view of the device is
//! shown next to the bridge's.

use std::fmt::Write as _;

use crate::channel::Channel;
use crate::rpc::RpcClient;

/// Handles one console line against the bridge's channel table.
pub(crate) async fn process(line: &str, channels: &[Channel], client: &RpcClient) -> String {
    let line = line.trim();
    if line == "hm serials" {
        return serials(channels);
    }
    if let Some(index) = parse_channel_command(line) {
        let Some(channel) = channels.get(index) else {
            return format!("error: channel {} does not exist\n", index + 1);
        };
        let mut out = overview(channel);
        if channel.is_active() {
            append_description(&mut out, channel, client).await;
        }
        return out;
    }
    format!("error: unknown command {line:?}\n")
}

/// Parses `hmNN` into a zero-based channel index.
fn parse_channel_command(line: &str) -> Option<usize> {
    let digits = line.strip_prefix("hm")?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: usize = digits.parse().ok()?;
    // channel numbers are 1-based on the console
    number.checked_sub(1)
}

fn serials(channels: &[Channel]) -> String {
    let mut out = String::from("known device serials:\n");
    for channel in channels.iter().filter(|c| c.is_active()) {
        let _ = writeln!(out, "  {:02}: {}", channel.index() + 1, channel.serial());
    }
    out
}

fn overview(channel: &Channel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "channel {:02}: {}",
        channel.index() + 1,
        channel.variant().kind_name()
    );
    if !channel.is_active() {
        out.push_str("  inactive\n");
        return out;
    }
    let _ = writeln!(out, "  serial: {}", channel.serial());
    let _ = writeln!(
        out,
        "  state: {}, writes {}",
        if channel.is_running() { "running" } else { "idle" },
        if channel.write_enabled() { "enabled" } else { "disabled" },
    );
    let _ = writeln!(
        out,
        "  flags: unreachable={} battery_warning={}",
        channel.is_unreachable(),
        channel.has_battery_warning(),
    );

    let stats = channel.stats();
    let _ = writeln!(
        out,
        "  polls: {} attempts, {} failures",
        stats.attempts, stats.failures
    );
    if let Some(duration) = stats.last_duration {
        let _ = writeln!(out, "  last cycle: {} ms", duration.as_millis());
    }
    if let Some(success) = stats.last_success {
        let _ = writeln!(
            out,
            "  last success: {}",
            success.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    out.push_str("  datapoints:\n");
    let device_level = [
        channel.reachable().clone(),
        channel.battery_low().clone(),
        channel.signal_quality().clone(),
    ];
    for datapoint in device_level.iter().chain(channel.variant().datapoints().iter()) {
        match datapoint.read() {
            Some(value) => {
                let _ = writeln!(out, "    {}: {}", datapoint.name(), value);
            }
            None => {
                let _ = writeln!(out, "    {}: -", datapoint.name());
            }
        }
    }
    out
}

async fn append_description(out: &mut String, channel: &Channel, client: &RpcClient) {
    match client.device_description(channel.serial()).await {
        Ok(pairs) => {
            out.push_str("  description:\n");
            for (name, text) in pairs {
                let _ = writeln!(out, "    {name}: {text}");
            }
        }
        Err(err) => {
            let _ = writeln!(out, "  description unavailable: {err}");
        }
    }
}
