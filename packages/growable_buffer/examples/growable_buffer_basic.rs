//! Basic usage example for `GrowableBuffer`.
//!
//! This example walks a buffer through the unlinked, linked and owned states and shows how the
//! length and capacity change along the way.

use growable_buffer::GrowableBuffer;

fn main() {
    let mut buffer = GrowableBuffer::new();
    println!("New buffer: {buffer:?}");

    buffer.extend_from_slice(b"Hello").unwrap();
    println!("After append: {buffer:?}");

    let gap = buffer.insert(5, 7).unwrap();
    buffer[gap..gap + 7].copy_from_slice(b", World");
    println!(
        "After insert: {:?} = {:?}",
        buffer,
        String::from_utf8_lossy(&buffer)
    );

    buffer.erase(0, 7);
    println!(
        "After erase: {:?} = {:?}",
        buffer,
        String::from_utf8_lossy(&buffer)
    );

    // Linking to memory owned by someone else does not allocate.
    let greeting = *b"linked greeting";
    let mut linked = GrowableBuffer::linked_read_only(&greeting);
    println!("Linked: {linked:?}");

    // Growing a linked buffer copies the linked bytes into owned storage.
    linked.extend_from_slice(b"!").unwrap();
    println!(
        "After growing the linked buffer: {:?} = {:?}",
        linked,
        String::from_utf8_lossy(&linked)
    );

    buffer.deallocate();
    println!("After deallocate: {buffer:?}");
}
