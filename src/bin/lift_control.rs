use lift_dispatch::services::dispatch::DispatchService;
use lift_dispatch::services::sink::UdpNoticeSink;
use lift_dispatch::services::udp_event::UdpEventLayer;
use lift_dispatch::services::validate::FloorBounds;
use lift_dispatch::{Building, Controller, Event};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tower::{Service, ServiceBuilder, ServiceExt};

const UDP_MAX_SIZE: usize = 65535;

const CONTROL_ADDRESS: &str = "127.0.0.1:11000";
const PANEL_ADDRESS: &str = "127.0.0.1:10000";

const ELEVATOR_COUNT: usize = 2;
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let socket = Arc::new(UdpSocket::bind(CONTROL_ADDRESS).await?);
    info!("Listening on {CONTROL_ADDRESS}");

    let building = Building::default();
    let mut controller = Controller::new(building);
    controller.create_elevators(ELEVATOR_COUNT);

    let sink = UdpNoticeSink::new(Arc::clone(&socket), PANEL_ADDRESS.parse()?);
    let dispatch = DispatchService::new(controller, Arc::new(sink));

    let mut ticker = dispatch.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            let result = match ticker.ready().await {
                Ok(svc) => svc.call(Event::Tick(1)).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                error!("tick failed: {e:#}");
            }
        }
    });

    let mut svc = ServiceBuilder::new()
        .layer(UdpEventLayer)
        .filter(FloorBounds::new(building, ELEVATOR_COUNT))
        .service(dispatch);

    let mut buf = vec![0u8; UDP_MAX_SIZE];
    loop {
        let (len, addr) = socket.recv_from(&mut buf).await?;
        info!("Got udp packet from {addr}");

        let raw = &buf[..len];
        ServiceExt::<&[u8]>::ready(&mut svc)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        match svc.call(raw).await {
            Ok(notices) => info!("{} notice(s) sent", notices.len()),
            Err(e) => warn!("Dropped packet from {addr}: {e}"),
        }
    }
}
