//! GPU buffer helpers.

use wgpu::util::DeviceExt;

/// Creates a vertex buffer from data.
///
/// Empty slices get a single zeroed element so the buffer stays bindable.
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    let zero = [T::zeroed()];
    let contents = if data.is_empty() { &zero[..] } else { data };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a 16-bit index buffer from data.
pub fn create_index_buffer(
    device: &wgpu::Device,
    data: &[u16],
    label: Option<&str>,
) -> wgpu::Buffer {
    // Buffer writes must be 4-byte aligned.
    let mut padded = data.to_vec();
    if padded.len() % 2 == 1 {
        padded.push(0);
    }
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(&padded),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Writes `data` into `buffer`, or recreates it when the data no longer fits.
///
/// Returns true if the buffer was recreated.
pub fn upload_vertex_data<T: bytemuck::Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &mut wgpu::Buffer,
    data: &[T],
    label: Option<&str>,
) -> bool {
    let bytes: &[u8] = bytemuck::cast_slice(data);
    if bytes.len() as u64 > buffer.size() {
        *buffer = create_vertex_buffer(device, data, label);
        true
    } else {
        if !bytes.is_empty() {
            queue.write_buffer(buffer, 0, bytes);
        }
        false
    }
}

/// Updates a uniform buffer with new data.
pub fn update_uniform_buffer<T: bytemuck::Pod>(
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    data: &T,
) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(data));
}
