//! Headless device creation.

use crate::error::{RenderError, RenderResult};

/// Requests a device and queue without a surface.
///
/// Fails with [`RenderError::AdapterCreationFailed`] when no adapter is
/// available, which is common on CI machines.
pub async fn request_headless_device() -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..wgpu::InstanceDescriptor::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(RenderError::AdapterCreationFailed)?;

    log::info!("using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("thickline device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await?;

    Ok((device, queue))
}
