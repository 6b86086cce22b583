use anyhow::Context;
use std::convert::TryFrom;

use crate::config::Floor;
use crate::elevator::ElevatorId;

/// Requests arriving at the controller, one per datagram.
///
/// `U<floor>` and `D<floor>` are hall calls, `P<elevator>:<floor>` a cabin
/// button and `T<count>` advances the fleet by `count` floors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    HallUp(Floor),
    HallDown(Floor),
    CabinPressed(ElevatorId, Floor),
    Tick(usize),
}

fn parse_floor(text: &str) -> anyhow::Result<Floor> {
    text.trim()
        .parse::<Floor>()
        .with_context(|| format!("failed to parse '{text}' as a floor"))
}

impl TryFrom<&[u8]> for Event {
    type Error = anyhow::Error;

    fn try_from(value: &[u8]) -> anyhow::Result<Self> {
        if value.len() < 2 {
            anyhow::bail!(
                "buffer too short: expected at least 2 bytes, got {}",
                value.len()
            );
        }

        let cmd = value[0];
        let arg = std::str::from_utf8(&value[1..]).context("argument is not valid UTF-8")?;

        match cmd {
            b'U' => Ok(Event::HallUp(parse_floor(arg)?)),
            b'D' => Ok(Event::HallDown(parse_floor(arg)?)),
            b'P' => {
                let (elevator, floor) = arg
                    .split_once(':')
                    .with_context(|| format!("expected <elevator>:<floor>, got '{arg}'"))?;
                let elevator = elevator
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("failed to parse '{elevator}' as an elevator id"))?;
                Ok(Event::CabinPressed(ElevatorId(elevator), parse_floor(floor)?))
            }
            b'T' => {
                let count = arg
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("failed to parse '{arg}' as a step count"))?;
                Ok(Event::Tick(count))
            }
            other => anyhow::bail!("unknown event byte: {other}"),
        }
    }
}
