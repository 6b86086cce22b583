use log::{debug, warn};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tokio::sync::Mutex;
use tower::Service;

use crate::config::Floor;
use crate::controller::Controller;
use crate::elevator::ElevatorId;
use crate::services::panel::PanelBuffer;
use crate::services::sink::NoticeSink;
use crate::types::direction::DirectionState;
use crate::types::event::Event;
use crate::types::notice::Notice;

#[derive(Debug)]
pub struct Dispatch {
    controller: Controller,
    panel: PanelBuffer,
}

impl Dispatch {
    pub fn new(controller: Controller) -> Self {
        Dispatch {
            controller,
            panel: PanelBuffer::default(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn panel(&self) -> &PanelBuffer {
        &self.panel
    }

    pub fn apply(&mut self, event: Event) -> Vec<Notice> {
        match event {
            Event::HallUp(floor) => vec![self.hall_call(floor, DirectionState::Up)],
            Event::HallDown(floor) => vec![self.hall_call(floor, DirectionState::Down)],
            Event::CabinPressed(elevator, floor) => vec![self.cabin_press(elevator, floor)],
            Event::Tick(count) => {
                let mut notices = Vec::new();
                for _ in 0..count {
                    let stops = self.controller.progress(1, &mut self.panel);
                    notices.extend(stops.into_iter().map(|stop| Notice::Stopped {
                        elevator: stop.elevator,
                        floor: stop.floor,
                    }));
                    self.release_held_presses();
                }
                notices
            }
        }
    }

    /// A car can go idle with presses still held, e.g. when the press it
    /// released was for the floor it stopped at. Those are applied directly.
    fn release_held_presses(&mut self) {
        let idle: Vec<ElevatorId> = self
            .controller
            .elevators()
            .iter()
            .filter(|car| car.is_idle())
            .map(|car| car.id())
            .collect();
        for elevator in idle {
            for floor in self.panel.drain(elevator) {
                debug!("elevator {elevator}: held press for {floor} released");
                if let Err(e) = self.controller.press(elevator, floor) {
                    warn!("held press rejected: {e}");
                }
            }
        }
    }

    fn hall_call(&mut self, floor: Floor, direction: DirectionState) -> Notice {
        match self.controller.call(floor, direction) {
            Ok(Some(elevator)) => Notice::Assigned { elevator, floor },
            Ok(None) => Notice::Backlogged(floor),
            Err(_) => Notice::Rejected(floor),
        }
    }

    /// A press in an idle car is served right away, a moving car picks it
    /// up at its next stop.
    fn cabin_press(&mut self, elevator: ElevatorId, floor: Floor) -> Notice {
        let idle = match self.controller.elevator(elevator) {
            Some(car) => car.is_idle(),
            None => {
                warn!("cabin press from unknown elevator {elevator}");
                return Notice::Rejected(floor);
            }
        };
        if let Err(e) = self.controller.building().validate_floor(floor) {
            warn!("cabin press rejected: {e}");
            return Notice::Rejected(floor);
        }

        if idle {
            if let Err(e) = self.controller.press(elevator, floor) {
                warn!("cabin press rejected: {e}");
                return Notice::Rejected(floor);
            }
        } else {
            debug!("elevator {elevator}: press for {floor} held until next stop");
            self.panel.push(elevator, floor);
        }
        Notice::Assigned { elevator, floor }
    }
}

/// Applies events to the shared dispatcher and publishes what happened.
#[derive(Clone)]
pub struct DispatchService {
    dispatch: Arc<Mutex<Dispatch>>,
    sink: Arc<dyn NoticeSink>,
}

impl DispatchService {
    pub fn new(controller: Controller, sink: Arc<dyn NoticeSink>) -> Self {
        DispatchService {
            dispatch: Arc::new(Mutex::new(Dispatch::new(controller))),
            sink,
        }
    }

    pub fn dispatch(&self) -> Arc<Mutex<Dispatch>> {
        Arc::clone(&self.dispatch)
    }
}

impl Service<Event> for DispatchService {
    type Response = Vec<Notice>;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Event) -> Self::Future {
        let dispatch = Arc::clone(&self.dispatch);
        let sink = Arc::clone(&self.sink);
        Box::pin(async move {
            let notices = dispatch.lock().await.apply(event);
            // the event is already applied, a lost notice must not undo that
            for notice in &notices {
                if let Err(e) = sink.publish(*notice).await {
                    warn!("notice {notice} not published: {e:#}");
                }
            }
            Ok::<_, anyhow::Error>(notices)
        })
    }
}
