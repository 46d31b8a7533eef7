//! wgpu Context
//!
//! [`GpuContext`] is the explicit render context every component receives: the
//! device, the queue and the [`ResourceLedger`] that tracks live GPU handles.
//! It can be created headless (tests, offline precompute) or as part of a
//! [`WgpuContext`], which additionally owns the window surface and handles
//! resize and presentation.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{PrismError, Result};
use crate::renderer::core::tracked::{ResourceCategory, ResourceLedger, Tracked};
use crate::renderer::settings::RendererSettings;

/// Device, queue and the resource ledger shared by every renderer component.
pub struct GpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
    /// Live/total counters of every [`Tracked`] resource created through this context
    pub ledger: ResourceLedger,
}

impl GpuContext {
    /// Wraps an existing device and routes its uncaptured errors to the log.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e}");
        }));
        Self {
            device,
            queue,
            ledger: ResourceLedger::new(),
        }
    }

    /// Requests an adapter without a surface.
    pub async fn headless(settings: &RendererSettings) -> Result<Self> {
        let instance = create_instance(settings);
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| PrismError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = request_device(&adapter).await?;
        Ok(Self::new(device, queue))
    }

    /// Wraps `inner` in a handle registered with this context's ledger.
    #[inline]
    pub fn track<T>(&self, inner: T, category: ResourceCategory) -> Tracked<T> {
        Tracked::new(inner, category, &self.ledger)
    }

    /// Largest width/height a 2D attachment may have on this device.
    #[inline]
    #[must_use]
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

fn create_instance(settings: &RendererSettings) -> wgpu::Instance {
    match settings.backends {
        Some(backends) => wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        }),
        None => wgpu::Instance::default(),
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!("Using adapter \"{}\" ({:?})", info.name, info.backend);
    let downlevel = adapter.get_downlevel_capabilities();
    if !downlevel.is_webgpu_compliant() {
        log::warn!(
            "Adapter is a downlevel device, missing {:?}",
            wgpu::DownlevelFlags::compliant().difference(downlevel.flags)
        );
    }

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Prism Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        })
        .await?;
    Ok((device, queue))
}

/// Window-backed context: a [`GpuContext`] plus the presentation surface.
pub struct WgpuContext {
    pub gpu: GpuContext,
    /// The window surface for presentation
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration
    pub config: wgpu::SurfaceConfiguration,
}

impl WgpuContext {
    pub async fn new<W>(
        window: W,
        settings: &RendererSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = create_instance(settings);
        let surface = instance
            .create_surface(window)
            .map_err(|e| PrismError::SurfaceCreateFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| PrismError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = request_device(&adapter).await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                PrismError::SurfaceCreateFailed("Surface not supported by adapter".to_string())
            })?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        Ok(Self {
            gpu: GpuContext::new(device, queue),
            surface,
            config,
        })
    }

    /// Reconfigures the surface. Zero-sized requests (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.gpu.device, &self.config);
        }
    }

    /// Returns the surface color format.
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
