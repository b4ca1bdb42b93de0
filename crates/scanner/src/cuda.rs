#![cfg(feature = "cuda")]

use crate::accelerator::{ComputeDevice, DeviceError, KernelBatch};
use cust::context::{Context, CurrentContext};
use cust::device::Device;
use cust::function::{BlockSize, GridSize};
use cust::memory::{CopyDestination, DeviceBuffer};
use cust::module::{Module, ModuleJitOption};
use cust::prelude::*;
use cust::stream::{Stream, StreamFlags};
use std::ffi::c_void;
use std::sync::Mutex;
use tracing::info;

const KERNEL: &str = "bubble_fit_f64";
const BLOCK_X: u32 = 128;

struct CudaState {
    module: Module,
    stream: Stream,
    context: Context,
}

// The driver handles are only touched while the mutex is held, after making
// the owning context current on the calling thread.
unsafe impl Send for CudaState {}

/// The CUDA implementation of the window fit, one thread per window.
pub struct CudaDevice {
    name: String,
    state: Mutex<CudaState>,
}

impl CudaDevice {
    pub fn new(device_id: u32) -> Result<Self, DeviceError> {
        cust::init(CudaFlags::empty()).map_err(unavailable)?;
        let device = Device::get_device(device_id).map_err(unavailable)?;
        let name = device.name().unwrap_or_else(|_| format!("cuda:{}", device_id));
        let context = Context::new(device).map_err(unavailable)?;

        let ptx: &str = include_str!(concat!(env!("OUT_DIR"), "/bubble_fit_kernel.ptx"));
        let module = Module::from_ptx(ptx, &[ModuleJitOption::DetermineTargetFromContext])
            .or_else(|_| Module::from_ptx(ptx, &[]))
            .map_err(unavailable)?;
        let stream = Stream::new(StreamFlags::NON_BLOCKING, None).map_err(unavailable)?;
        info!(device = %name, "CUDA device initialized.");

        Ok(Self {
            name,
            state: Mutex::new(CudaState { module, stream, context }),
        })
    }
}

impl ComputeDevice for CudaDevice {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn dispatch(&self, batch: &KernelBatch<'_>) -> Result<Vec<[f64; 3]>, DeviceError> {
        let state = self
            .state
            .lock()
            .map_err(|_| DeviceError::Launch("device state poisoned".to_string()))?;
        CurrentContext::set_current(&state.context).map_err(launch)?;

        let window: i32 = batch
            .window
            .try_into()
            .map_err(|_| DeviceError::Launch("window exceeds i32".to_string()))?;
        let count: i32 = batch
            .count
            .try_into()
            .map_err(|_| DeviceError::Launch("batch exceeds i32".to_string()))?;

        let d_prices = DeviceBuffer::from_slice(batch.prices).map_err(launch)?;
        let d_time_power = DeviceBuffer::from_slice(batch.time_power).map_err(launch)?;
        let d_cos_term = DeviceBuffer::from_slice(batch.cos_term).map_err(launch)?;
        let d_out: DeviceBuffer<f64> = DeviceBuffer::zeroed(batch.count * 3).map_err(launch)?;

        let func = state
            .module
            .get_function(KERNEL)
            .map_err(|_| DeviceError::Launch(format!("missing kernel symbol {}", KERNEL)))?;
        let grid_x = (batch.count as u32).div_ceil(BLOCK_X).max(1);
        let grid: GridSize = (grid_x, 1, 1).into();
        let block: BlockSize = (BLOCK_X, 1, 1).into();

        unsafe {
            let mut prices_ptr = d_prices.as_device_ptr().as_raw();
            let mut time_power_ptr = d_time_power.as_device_ptr().as_raw();
            let mut cos_term_ptr = d_cos_term.as_device_ptr().as_raw();
            let mut window_i = window;
            let mut count_i = count;
            let mut out_ptr = d_out.as_device_ptr().as_raw();
            let args: &mut [*mut c_void] = &mut [
                &mut prices_ptr as *mut _ as *mut c_void,
                &mut time_power_ptr as *mut _ as *mut c_void,
                &mut cos_term_ptr as *mut _ as *mut c_void,
                &mut window_i as *mut _ as *mut c_void,
                &mut count_i as *mut _ as *mut c_void,
                &mut out_ptr as *mut _ as *mut c_void,
            ];
            state.stream.launch(&func, grid, block, 0, args).map_err(launch)?;
        }
        state.stream.synchronize().map_err(launch)?;

        let mut host = vec![0.0f64; batch.count * 3];
        d_out.copy_to(&mut host[..]).map_err(launch)?;
        Ok(host.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    }
}

/// True when the driver initializes and reports at least one device.
pub fn cuda_available() -> bool {
    if cust::init(CudaFlags::empty()).is_err() {
        return false;
    }
    matches!(Device::num_devices(), Ok(n) if n > 0)
}

fn unavailable(e: cust::error::CudaError) -> DeviceError {
    DeviceError::Unavailable(e.to_string())
}

fn launch(e: cust::error::CudaError) -> DeviceError {
    DeviceError::Launch(e.to_string())
}
