//! BLE notifier adapter.
//!
//! Implements [`NotifierPort`]: pushes each [`StatusRecord`] to the
//! companion app as a GATT notification.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Attribute      | UUID                                     | Perms              |
//! |----------------|------------------------------------------|--------------------|
//! | Service        | `12345678-1234-1234-1234-123456789abc`   |                    |
//! | Sensor data    | `87654321-4321-4321-4321-cba987654321`   | Read+Write+Notify  |
//! | CCC descriptor | `0x2902`                                 | Read+Write         |
//!
//! The connection flag is the only thing the GATTS callback shares with
//! the main loop.  The callback never restarts advertising itself; the
//! [`LinkTracker`](crate::app::link::LinkTracker) schedules that.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use log::{info, warn};

use crate::app::ports::NotifierPort;
use crate::app::record::{RECORD_CAPACITY, StatusRecord};
use crate::error::CommsError;

#[cfg(not(target_os = "espidf"))]
use crate::app::record::RecordBuf;

#[cfg(target_os = "espidf")]
use log::error;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x12345678_1234_1234_1234_123456789abc;
pub const CHAR_SENSOR_DATA: u128 = 0x87654321_4321_4321_4321_cba987654321;
pub const DEVICE_NAME: &str = "ESP32-WaterSensor";

/// Service UUID as it appears on air (little-endian), so centrals can
/// filter scans by service.
pub const ADV_SERVICE_UUID: [u8; 16] = SERVICE_UUID.to_le_bytes();

/// Legacy advertising and scan-response payloads are capped at 31 bytes.
const LEGACY_ADV_MAX: usize = 31;
/// Flags AD (3 bytes) plus the complete 128-bit service list AD (2 + 16).
const ADV_PAYLOAD_LEN: usize = 3 + 2 + ADV_SERVICE_UUID.len();
/// The name rides in the scan response; it does not fit beside the UUID.
const SCAN_RSP_PAYLOAD_LEN: usize = 2 + DEVICE_NAME.len();
const _: () = assert!(ADV_PAYLOAD_LEN <= LEGACY_ADV_MAX);
const _: () = assert!(SCAN_RSP_PAYLOAD_LEN <= LEGACY_ADV_MAX);

/// Characteristic value buffer; a record never exceeds it.
pub const MAX_CHAR_LEN: usize = RECORD_CAPACITY;

/// ATT default before any MTU exchange.
const DEFAULT_ATT_MTU: u16 = 23;
const ATT_NOTIFY_HEADER: u16 = 3;

// ───────────────────────────────────────────────────────────────
// Shared state (written by the Bluedroid task)
// ───────────────────────────────────────────────────────────────

/// Set while a central is connected.  Written from the GATTS callback,
/// read by the main loop.
pub static SUBSCRIBER_CONNECTED: AtomicBool = AtomicBool::new(false);

/// ATT MTU negotiated with the current central.
static NEGOTIATED_MTU: AtomicU16 = AtomicU16::new(DEFAULT_ATT_MTU);

/// Largest notification the stack will deliver without truncation.
pub fn notify_capacity() -> usize {
    usize::from(NEGOTIATED_MTU.load(Ordering::Relaxed).saturating_sub(ATT_NOTIFY_HEADER))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF Bluedroid plumbing
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod stack {
    use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

    use esp_idf_svc::sys::*;

    use super::{
        ADV_SERVICE_UUID, CHAR_SENSOR_DATA, DEVICE_NAME, NEGOTIATED_MTU, SERVICE_UUID,
        SUBSCRIBER_CONNECTED,
    };

    // Bluedroid callbacks are C function pointers that cannot capture
    // Rust closures.  These atomics bridge the callback context to the adapter.
    pub(super) static GATTS_IF: AtomicU32 = AtomicU32::new(0);
    pub(super) static CONN_ID: AtomicU32 = AtomicU32::new(0);
    pub(super) static SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
    pub(super) static DATA_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);

    /// NUL-terminated copy of the advertised name.
    const DEVICE_NAME_C: &[u8] = b"ESP32-WaterSensor\0";
    const _: () = assert!(DEVICE_NAME_C.len() == DEVICE_NAME.len() + 1);

    /// Initial characteristic value until the first record is published.
    static INITIAL_VALUE: [u8; 2] = *b"{}";

    /// Bluedroid copies the service list out of this buffer when the
    /// advertising data is configured.
    static ADV_UUID: [u8; 16] = ADV_SERVICE_UUID;

    /// Advertising starts once both payloads are accepted.
    static ADV_CONFIG_PENDING: AtomicU8 = AtomicU8::new(0);
    const ADV_CONFIG_FLAG: u8 = 1 << 0;
    const SCAN_RSP_CONFIG_FLAG: u8 = 1 << 1;

    fn adv_config_done(flag: u8) {
        let before = ADV_CONFIG_PENDING.fetch_and(!flag, Ordering::AcqRel);
        if before != 0 && before & !flag == 0 {
            let mut params = adv_params();
            unsafe { esp_ble_gap_start_advertising(&mut params) };
        }
    }

    const SERVICE_NUM_HANDLES: u16 = 4;

    fn uuid128(uuid: u128) -> esp_bt_uuid_t {
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 16;
        t.uuid.uuid128 = uuid.to_le_bytes();
        t
    }

    fn uuid16(uuid: u16) -> esp_bt_uuid_t {
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 2;
        t.uuid.uuid16 = uuid;
        t
    }

    pub(super) fn adv_params() -> esp_ble_adv_params_t {
        esp_ble_adv_params_t {
            adv_int_min: 0x20,
            adv_int_max: 0x40,
            adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
            own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
            channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
            adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
            // SAFETY: remaining fields are plain integers / byte arrays.
            ..unsafe { core::mem::zeroed() }
        }
    }

    pub(super) unsafe extern "C" fn gap_event_handler(
        event: esp_gap_ble_cb_event_t,
        _param: *mut esp_ble_gap_cb_param_t,
    ) {
        match event {
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
                adv_config_done(ADV_CONFIG_FLAG);
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RSP_DATA_SET_COMPLETE_EVT => {
                adv_config_done(SCAN_RSP_CONFIG_FLAG);
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising started");
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising stopped");
            }
            _ => {}
        }
    }

    pub(super) unsafe extern "C" fn gatts_event_handler(
        event: esp_gatts_cb_event_t,
        gatts_if: esp_gatt_if_t,
        param: *mut esp_ble_gatts_cb_param_t,
    ) {
        match event {
            esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
                GATTS_IF.store(u32::from(gatts_if), Ordering::Relaxed);
                log::info!("BLE GATTS: app registered (if={})", gatts_if);
                unsafe {
                    esp_ble_gap_set_device_name(DEVICE_NAME_C.as_ptr().cast());
                    ADV_CONFIG_PENDING
                        .store(ADV_CONFIG_FLAG | SCAN_RSP_CONFIG_FLAG, Ordering::Release);
                    let mut adv_data = esp_ble_adv_data_t {
                        set_scan_rsp: false,
                        include_name: false,
                        include_txpower: false,
                        flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                        service_uuid_len: ADV_UUID.len() as u16,
                        p_service_uuid: ADV_UUID.as_ptr().cast_mut(),
                        ..core::mem::zeroed()
                    };
                    esp_ble_gap_config_adv_data(&mut adv_data);
                    let mut scan_rsp = esp_ble_adv_data_t {
                        set_scan_rsp: true,
                        include_name: true,
                        include_txpower: false,
                        ..core::mem::zeroed()
                    };
                    esp_ble_gap_config_adv_data(&mut scan_rsp);

                    let mut svc_id = esp_gatt_srvc_id_t {
                        id: esp_gatt_id_t {
                            uuid: uuid128(SERVICE_UUID),
                            inst_id: 0,
                        },
                        is_primary: true,
                    };
                    esp_ble_gatts_create_service(gatts_if, &mut svc_id, SERVICE_NUM_HANDLES);
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
                let svc_handle = unsafe { (*param).create.service_handle };
                SVC_HANDLE.store(u32::from(svc_handle), Ordering::Relaxed);
                log::info!("BLE GATTS: service created (handle={})", svc_handle);
                unsafe {
                    esp_ble_gatts_start_service(svc_handle);
                    let mut char_uuid = uuid128(CHAR_SENSOR_DATA);
                    let mut value = esp_attr_value_t {
                        attr_max_len: super::MAX_CHAR_LEN as u16,
                        attr_len: INITIAL_VALUE.len() as u16,
                        attr_value: INITIAL_VALUE.as_ptr().cast_mut(),
                    };
                    let mut control = esp_attr_control_t {
                        auto_rsp: ESP_GATT_AUTO_RSP as u8,
                    };
                    esp_ble_gatts_add_char(
                        svc_handle,
                        &mut char_uuid,
                        (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                        (ESP_GATT_CHAR_PROP_BIT_READ
                            | ESP_GATT_CHAR_PROP_BIT_WRITE
                            | ESP_GATT_CHAR_PROP_BIT_NOTIFY) as esp_gatt_char_prop_t,
                        &mut value,
                        &mut control,
                    );
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
                let handle = unsafe { (*param).add_char.attr_handle };
                DATA_CHAR_HANDLE.store(u32::from(handle), Ordering::Relaxed);
                log::info!("BLE GATTS: sensor data char (handle={})", handle);
                let svc_handle = SVC_HANDLE.load(Ordering::Relaxed) as u16;
                let mut ccc = uuid16(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
                unsafe {
                    esp_ble_gatts_add_char_descr(
                        svc_handle,
                        &mut ccc,
                        (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                        core::ptr::null_mut(),
                        core::ptr::null_mut(),
                    );
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
                let handle = unsafe { (*param).add_char_descr.attr_handle };
                log::info!("BLE GATTS: CCC descriptor (handle={})", handle);
            }
            esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
                let conn_id = unsafe { (*param).connect.conn_id };
                CONN_ID.store(u32::from(conn_id), Ordering::Relaxed);
                SUBSCRIBER_CONNECTED.store(true, Ordering::Release);
            }
            esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
                NEGOTIATED_MTU.store(super::DEFAULT_ATT_MTU, Ordering::Relaxed);
                SUBSCRIBER_CONNECTED.store(false, Ordering::Release);
            }
            esp_gatts_cb_event_t_ESP_GATTS_MTU_EVT => {
                let mtu = unsafe { (*param).mtu.mtu };
                NEGOTIATED_MTU.store(mtu, Ordering::Relaxed);
                log::info!("BLE GATTS: MTU {}", mtu);
            }
            _ => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleNotifier {
    state: BleState,
    connected: &'static AtomicBool,
    published: u32,
    /// Simulation: last payload handed to the "stack".
    #[cfg(not(target_os = "espidf"))]
    last_payload: Option<RecordBuf>,
    /// Simulation: advertising restarts requested so far.
    #[cfg(not(target_os = "espidf"))]
    advertise_restarts: u32,
}

impl Default for BleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BleNotifier {
    /// Adapter bound to the global [`SUBSCRIBER_CONNECTED`] flag.
    pub fn new() -> Self {
        Self::with_flag(&SUBSCRIBER_CONNECTED)
    }

    /// Adapter bound to a caller-owned flag.  Host tests use this so they
    /// do not race on the global.
    pub fn with_flag(connected: &'static AtomicBool) -> Self {
        Self {
            state: BleState::Idle,
            connected,
            published: 0,
            #[cfg(not(target_os = "espidf"))]
            last_payload: None,
            #[cfg(not(target_os = "espidf"))]
            advertise_restarts: 0,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn published(&self) -> u32 {
        self.published
    }

    /// Bring up the controller, register the GATT app and start advertising.
    pub fn start(&mut self) -> Result<(), CommsError> {
        info!("BLE: starting advertising as '{}'", DEVICE_NAME);
        match self.platform_start() {
            Ok(()) => {
                self.state = BleState::Advertising;
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        let check = |what: &str, ret: esp_err_t| {
            if ret != ESP_OK as i32 {
                error!("BLE: {} failed ({})", what, ret);
                Err(CommsError::BleInitFailed)
            } else {
                Ok(())
            }
        };

        // SAFETY: called once from the main task before the loop starts.
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            check("bt_controller_init", esp_bt_controller_init(&mut bt_cfg))?;
            check("bt_controller_enable", esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE))?;
            check("bluedroid_init", esp_bluedroid_init())?;
            check("bluedroid_enable", esp_bluedroid_enable())?;

            check(
                "gap_register_callback",
                esp_ble_gap_register_callback(Some(stack::gap_event_handler)),
            )?;
            check(
                "gatts_register_callback",
                esp_ble_gatts_register_callback(Some(stack::gatts_event_handler)),
            )?;
            check("gatts_app_register", esp_ble_gatts_app_register(0))?;
        }
        info!("BLE(espidf): Bluedroid stack initialized");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        info!("BLE(sim): advertising '{}' (service {:032x})", DEVICE_NAME, SERVICE_UUID);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_send(&mut self, payload: &str) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        let handle = stack::DATA_CHAR_HANDLE.load(Ordering::Relaxed) as u16;
        if handle == 0 {
            return Err(CommsError::NotConnected);
        }
        let len = payload.len() as u16;
        let ptr = payload.as_ptr().cast_mut();
        // SAFETY: the stack copies the value before returning.
        unsafe {
            esp_ble_gatts_set_attr_value(handle, len, ptr);
            let ret = esp_ble_gatts_send_indicate(
                stack::GATTS_IF.load(Ordering::Relaxed) as esp_gatt_if_t,
                stack::CONN_ID.load(Ordering::Relaxed) as u16,
                handle,
                len,
                ptr,
                false,
            );
            if ret != ESP_OK as i32 {
                warn!("BLE: notify failed ({})", ret);
                return Err(CommsError::NotConnected);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_send(&mut self, payload: &str) -> Result<(), CommsError> {
        let mut buf = RecordBuf::new();
        buf.push_str(payload).map_err(|_| CommsError::PayloadTooLarge)?;
        self.last_payload = Some(buf);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_readvertise(&mut self) {
        let mut params = stack::adv_params();
        // SAFETY: params outlives the call; the stack copies it.
        let ret = unsafe { esp_idf_svc::sys::esp_ble_gap_start_advertising(&mut params) };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            warn!("BLE: start_advertising failed ({})", ret);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_readvertise(&mut self) {
        self.advertise_restarts += 1;
        info!("BLE(sim): advertising restarted");
    }

    /// Simulation: last payload pushed through [`NotifierPort::publish`].
    #[cfg(not(target_os = "espidf"))]
    pub fn last_payload(&self) -> Option<&str> {
        self.last_payload.as_deref()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn advertise_restarts(&self) -> u32 {
        self.advertise_restarts
    }
}

// ───────────────────────────────────────────────────────────────
// NotifierPort implementation
// ───────────────────────────────────────────────────────────────

impl NotifierPort for BleNotifier {
    fn is_subscriber_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn publish(&mut self, record: &StatusRecord) -> Result<(), CommsError> {
        if self.state != BleState::Advertising || !self.is_subscriber_connected() {
            return Err(CommsError::NotConnected);
        }
        let payload = record.to_wire_json()?;
        if payload.len() > MAX_CHAR_LEN {
            return Err(CommsError::PayloadTooLarge);
        }
        let capacity = notify_capacity();
        if payload.len() > capacity {
            warn!(
                "BLE: notification truncated ({} > {} bytes at current MTU)",
                payload.len(),
                capacity
            );
        }
        self.platform_send(&payload)?;
        self.published = self.published.wrapping_add(1);
        Ok(())
    }

    fn restart_advertising(&mut self) {
        if self.state == BleState::Advertising {
            self.platform_readvertise();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
