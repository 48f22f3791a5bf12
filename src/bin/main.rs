#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull, RtcPin},
    rtc_cntl::{reset_reason, wakeup_cause},
    spi::master::Spi,
    system::Cpu,
    time::Rate,
    timer::timg::TimerGroup,
};
use log::{LevelFilter, info, warn};
use mictoggle_core::{
    config::{DeviceConfig, Endpoint, RESPONSE_CAPACITY, ToggleRoute, WifiConfig},
    connectivity::{ConnectProgress, ConnectivityManager},
    control::ControlLoop,
    render::{DisplaySink, Screen},
};
use mictoggle_hal_esp32s3::{
    input::buttons::{ButtonConfig, DualButtons},
    network::{EmbassyClock, TcpTransport, WifiAssociation},
    render::{PanelSink, text::TextScreenRenderer},
};
use sharp_memlcd::SharpPanel;
use static_cell::StaticCell;

use power::DeepSleepPower;

#[path = "main/power.rs"]
mod power;

const DISPLAY_SPI_HZ: u32 = 1_000_000;
const BUTTON_DEBOUNCE_POLLS: u8 = 2;
const TCP_RX_BYTES: usize = 1024;
const TCP_TX_BYTES: usize = 256;

const WIFI_SSID: &str = env!(
    "MICTOGGLE_WIFI_SSID",
    "Set MICTOGGLE_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "MICTOGGLE_WIFI_PASSWORD",
    "Set MICTOGGLE_WIFI_PASSWORD in your environment before building/flashing."
);
const SERVER_ADDR: &str = env!(
    "MICTOGGLE_SERVER_ADDR",
    "Set MICTOGGLE_SERVER_ADDR (dotted IPv4) before building/flashing."
);
const SERVER_PORT: &str = env!(
    "MICTOGGLE_SERVER_PORT",
    "Set MICTOGGLE_SERVER_PORT before building/flashing."
);
const ROUTE: &str = match option_env!("MICTOGGLE_ROUTE") {
    Some(route) => route,
    None => "bt",
};
const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);

static NET_RESOURCES: StaticCell<embassy_net::StackResources<3>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

async fn park() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

fn device_config() -> Option<DeviceConfig> {
    let endpoint = match Endpoint::parse(SERVER_ADDR, SERVER_PORT) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            info!(
                "config: bad server endpoint addr={} port={} err={:?}",
                SERVER_ADDR, SERVER_PORT, err
            );
            return None;
        }
    };
    let route = match ToggleRoute::parse(ROUTE) {
        Ok(route) => route,
        Err(err) => {
            info!("config: bad route {} err={:?}", ROUTE, err);
            return None;
        }
    };

    Some(DeviceConfig::new(WIFI_CONFIG, endpoint, route))
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: mictoggle starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    info!(
        "boot reset_reason={:?} wakeup_cause={:?}",
        reset_reason(Cpu::ProCpu),
        wakeup_cause()
    );

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let Some(device) = device_config() else {
        park().await
    };

    // Display wiring: CLK=GPIO13, DI=GPIO14, CS=GPIO15, DISP=GPIO2, EMD=GPIO9
    let disp_pin = peripherals.GPIO2;
    // Release the pad hold left by deep sleep before driving DISP again.
    disp_pin.rtcio_pad_hold(false);
    let disp = Output::new(disp_pin, Level::Low, OutputConfig::default());
    let emd = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        // LS027B7DH01 uses CPOL=0, CPHA=1.
        .with_mode(esp_hal::spi::Mode::_1);
    let spi = match Spi::new(peripherals.SPI2, spi_config) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO13)
            .with_mosi(peripherals.GPIO14),
        Err(err) => {
            info!("display spi config failed: {:?}", err);
            park().await
        }
    };

    let mut delay = Delay::new();
    let mut panel = SharpPanel::new(spi, disp, emd, cs);
    if let Err(err) = panel.initialize(&mut delay) {
        warn!("display initialize failed: {:?}", err);
    }
    if let Err(err) = panel.clear_all(&mut delay) {
        warn!("display clear failed: {:?}", err);
    }
    let mut display = PanelSink::new(TextScreenRenderer::new(), panel, delay);
    display.show(Screen::Boot {
        route: device.route,
    });

    // Buttons: A (toggle, also the deep-sleep wake pin)=GPIO12, B (power)=GPIO11
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let button_a = Input::new(peripherals.GPIO12, input_cfg);
    let button_b = Input::new(peripherals.GPIO11, input_cfg);
    let mut buttons = match DualButtons::new(
        button_a,
        button_b,
        ButtonConfig::default().with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
    ) {
        Ok(buttons) => buttons,
        Err(err) => {
            info!("buttons init failed: {:?}", err);
            park().await
        }
    };

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            park().await
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                park().await
            }
        };

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<3>::new()),
        0x6D1C_7066_9E1E_0B75,
    );

    info!(
        "mictoggle configured: ssid={} endpoint={} route={} request={:?}",
        device.wifi.ssid,
        device.endpoint,
        device.route.label(),
        device.route.request().request_line()
    );
    info!("Display pins: CLK=GPIO13 DI=GPIO14 CS=GPIO15 DISP=GPIO2 EMD=GPIO9");
    info!("Button pins: A=GPIO12 B=GPIO11");

    let net_future = net_runner.run();
    let app_future = async {
        let mut clock = EmbassyClock;
        let mut association = WifiAssociation::new(&mut wifi_controller, stack);
        let mut manager = ConnectivityManager::new(device.association);
        let link = manager
            .connect_with(
                &mut association,
                &mut clock,
                &device.wifi,
                |progress| {
                    if let ConnectProgress::AttemptStarted { attempt } = progress {
                        display.show(Screen::Connecting {
                            ssid: device.wifi.ssid,
                            attempt,
                        });
                    }
                },
            )
            .await;

        display.show(Screen::Ready {
            ssid: link.ssid.as_str(),
            address: link.address,
            route: device.route,
        });

        let mut transport = TcpTransport::<TCP_RX_BYTES, TCP_TX_BYTES>::new(stack);
        let mut control = ControlLoop::<RESPONSE_CAPACITY>::from_config(&device);
        let mut power = DeepSleepPower::new();
        control
            .run(&mut buttons, &mut transport, &mut clock, &mut display, &mut power)
            .await
    };

    let _ = embassy_futures::join::join(net_future, app_future).await;
    unreachable!()
}
