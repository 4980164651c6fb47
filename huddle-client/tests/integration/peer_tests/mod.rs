mod test_leave_cleanup;
