mod test_leave_disposes_both_legs;
mod test_leave_outside_room_is_noop;
