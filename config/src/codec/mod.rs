pub mod bytes_num;
